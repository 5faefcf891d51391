//! CLI argument definitions for `river`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `series` | Acquire the aligned price/PER series |
//! | `bands` | Acquire and compute the valuation river |
//! | `latest` | Latest defined bands and valuation zone |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--lookback-days` | `1825` | Calendar days of history to request |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//! | `--as-of` | today (UTC) | Last date of the lookback window |
//! | `--fixture` | none | Serve data from a local JSON file |
//! | `--log-level` | `warn` | Diagnostics level on stderr |
//!
//! Unset options fall back to the `RIVER_*` / `FINMIND_*` environment
//! variables, then to built-in defaults.
//!
//! # Examples
//!
//! ```bash
//! river latest 2330 --pretty
//! river bands 2330 --window 480 --min-periods 120 --format table
//! river series 2330 --fixture demos/2330.json --as-of 2024-06-28
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Valuation river: PER bands projected into price for Taiwan-listed securities.
#[derive(Debug, Parser)]
#[command(
    name = "river",
    author,
    version,
    about = "PER valuation river bands for a single security"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Calendar days of history to request, ending at the as-of date.
    #[arg(long, global = true)]
    pub lookback_days: Option<u32>,

    /// Per-request timeout budget in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Last date of the lookback window (YYYY-MM-DD). Defaults to today in UTC.
    #[arg(long, global = true)]
    pub as_of: Option<String>,

    /// Read prices and multiples from a JSON fixture instead of FinMind.
    #[arg(long, global = true, value_name = "PATH")]
    pub fixture: Option<PathBuf>,

    /// Diagnostics level written to stderr. `RUST_LOG` takes precedence.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Column table for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Compact JSON on one line.
    Ndjson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Acquire the date-aligned close/PER/PBR series with derived EPS.
    ///
    ///   river series 2330
    Series(SeriesArgs),

    /// Compute rolling PER statistics and the five price bands for every date.
    ///
    ///   river bands 2330 --window 720 --min-periods 200
    Bands(RiverArgs),

    /// Show the most recent date with defined bands and where the close sits.
    ///
    ///   river latest 2330
    Latest(RiverArgs),
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Security identifier, e.g. 2330.
    pub stock_id: String,
}

#[derive(Debug, Args)]
pub struct RiverArgs {
    /// Security identifier, e.g. 2330.
    pub stock_id: String,

    /// Rolling window length in aligned records.
    #[arg(long)]
    pub window: Option<usize>,

    /// Records required before statistics are defined.
    #[arg(long)]
    pub min_periods: Option<usize>,
}
