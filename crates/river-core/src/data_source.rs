//! Data source trait and request types.
//!
//! The river needs exactly two upstream daily series per security:
//!
//! | Dataset | Upstream name | Fields |
//! |---------|---------------|--------|
//! | [`Dataset::Price`] | `TaiwanStockPrice` | date, close |
//! | [`Dataset::ValuationMultiples`] | `TaiwanStockPER` | date, PER, PBR |
//!
//! Adapters implement [`DataSource`]; the acquirer only ever talks to the trait.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{MultiplePoint, PricePoint, ProviderId, StockId, TradingDate};

/// Upstream dataset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Price,
    ValuationMultiples,
}

impl Dataset {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::ValuationMultiples => "valuation_multiples",
        }
    }

    /// Dataset name understood by the FinMind API.
    pub const fn upstream_name(self) -> &'static str {
        match self {
            Self::Price => "TaiwanStockPrice",
            Self::ValuationMultiples => "TaiwanStockPER",
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    InvalidRequest,
    Unavailable,
    Timeout,
    Upstream,
    Decode,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn upstream(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: SourceErrorKind::Upstream,
            message: message.into(),
            retryable,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::Upstream => "source.upstream",
            SourceErrorKind::Decode => "source.decode",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload shared by both series queries. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub stock_id: StockId,
    pub start_date: TradingDate,
    pub end_date: TradingDate,
}

impl SeriesRequest {
    pub fn new(
        stock_id: StockId,
        start_date: TradingDate,
        end_date: TradingDate,
    ) -> Result<Self, SourceError> {
        if start_date > end_date {
            return Err(SourceError::invalid_request(format!(
                "series request start date {start_date} is after end date {end_date}"
            )));
        }
        Ok(Self {
            stock_id,
            start_date,
            end_date,
        })
    }

    /// Request covering `[today - lookback_days, today]`.
    pub fn lookback(stock_id: StockId, today: TradingDate, lookback_days: u32) -> Self {
        Self {
            stock_id,
            start_date: today.days_before(lookback_days),
            end_date: today,
        }
    }

    pub fn contains(&self, date: TradingDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Future returned by [`DataSource`] queries.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// Each call is a single bounded request/response: implementations must not
/// retry internally, and an empty `Vec` is a valid answer rather than an error.
///
/// Implementations must be `Send + Sync` because the acquirer issues both
/// queries concurrently.
pub trait DataSource: Send + Sync {
    /// Returns the unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches daily closing prices within the request's date range.
    fn price_series<'a>(&'a self, req: SeriesRequest) -> SourceFuture<'a, Vec<PricePoint>>;

    /// Fetches daily PER/PBR rows within the request's date range.
    fn multiple_series<'a>(&'a self, req: SeriesRequest) -> SourceFuture<'a, Vec<MultiplePoint>>;
}
