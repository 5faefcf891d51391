use thiserror::Error;

/// Validation and contract errors exposed by `river-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("stock id cannot be empty")]
    EmptyStockId,
    #[error("stock id length {len} exceeds max {max}")]
    StockIdTooLong { len: usize, max: usize },
    #[error("stock id contains invalid character '{ch}' at index {index}")]
    StockIdInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: String, end: String },
    #[error("dates must be strictly increasing: {next} follows {previous}")]
    UnorderedDates { previous: String, next: String },

    #[error("invalid source '{value}', expected one of finmind, fixture")]
    InvalidSource { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be positive")]
    NonPositiveValue { field: &'static str },

    #[error("rolling window must be at least 1")]
    ZeroWindow,
    #[error("min_periods must be between 1 and the window size {window}, got {min_periods}")]
    InvalidMinPeriods { min_periods: usize, window: usize },

    #[error("environment variable {name} has an invalid value '{value}'")]
    InvalidEnvValue { name: &'static str, value: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
