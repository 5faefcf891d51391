//! Runtime configuration.
//!
//! Values come from [`RiverConfig::default`], then environment variables,
//! then explicit overrides applied by the caller (CLI flags).
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FINMIND_API_TOKEN` | `token` |
//! | `FINMIND_BASE_URL` | `base_url` |
//! | `RIVER_TIMEOUT_MS` | `timeout_ms` |
//! | `RIVER_LOOKBACK_DAYS` | `lookback_days` |
//! | `RIVER_WINDOW` | `params.window` |
//! | `RIVER_MIN_PERIODS` | `params.min_periods` |

use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use crate::acquire::DEFAULT_LOOKBACK_DAYS;
use crate::adapters::FINMIND_DEFAULT_BASE_URL;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::river::RiverParams;
use crate::ValidationError;

pub const TOKEN_ENV: &str = "FINMIND_API_TOKEN";
pub const BASE_URL_ENV: &str = "FINMIND_BASE_URL";
pub const TIMEOUT_ENV: &str = "RIVER_TIMEOUT_MS";
pub const LOOKBACK_ENV: &str = "RIVER_LOOKBACK_DAYS";
pub const WINDOW_ENV: &str = "RIVER_WINDOW";
pub const MIN_PERIODS_ENV: &str = "RIVER_MIN_PERIODS";

#[derive(Clone, PartialEq, Eq)]
pub struct RiverConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_ms: u64,
    pub lookback_days: u32,
    pub params: RiverParams,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(FINMIND_DEFAULT_BASE_URL),
            token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            params: RiverParams::default(),
        }
    }
}

impl Debug for RiverConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiverConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("lookback_days", &self.lookback_days)
            .field("params", &self.params)
            .finish()
    }
}

impl RiverConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let window = parse_var(&read, WINDOW_ENV)?.unwrap_or(defaults.params.window());
        let min_periods =
            parse_var(&read, MIN_PERIODS_ENV)?.unwrap_or(defaults.params.min_periods());

        Ok(Self {
            base_url: read(BASE_URL_ENV).unwrap_or(defaults.base_url),
            token: read(TOKEN_ENV),
            timeout_ms: parse_var(&read, TIMEOUT_ENV)?.unwrap_or(defaults.timeout_ms),
            lookback_days: parse_var(&read, LOOKBACK_ENV)?.unwrap_or(defaults.lookback_days),
            params: RiverParams::new(window, min_periods)?,
        })
    }
}

fn parse_var<T, F>(read: &F, name: &'static str) -> Result<Option<T>, ValidationError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    read(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ValidationError::InvalidEnvValue { name, value })
        })
        .transpose()
}
