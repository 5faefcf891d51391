//! Diagnostics on stderr.
//!
//! Transport crates (hyper, reqwest, h2, rustls) are pinned to `warn` so that
//! `--log-level debug` shows acquisition and river events without connection
//! pool chatter. `RUST_LOG` replaces the whole filter when set.

use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

fn build_directives(level: LogLevel) -> String {
    let mut directives = String::from(level.as_str());
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }
    directives
}

fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(build_directives(level)))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();

    tracing::debug!(
        log_level = level.as_str(),
        noise_filtered = NOISY_MODULES.len(),
        "logging initialized"
    );
}
