//! # River Core
//!
//! Valuation-river computation for a single security.
//!
//! ## Overview
//!
//! A valuation river annotates a daily price history with bands derived from
//! the security's own PER history: the rolling mean and ±1/±2 standard
//! deviations of PER, converted back to price through trailing EPS. It answers
//! "is today's price cheap or expensive relative to how this stock has
//! usually been valued?".
//!
//! The pipeline has two stages:
//!
//! 1. **Acquire** ([`SeriesAcquirer`]): fetch daily closes and PER/PBR for a
//!    lookback window, inner-join them on date and derive EPS.
//! 2. **Transform** ([`transform`]): rolling PER statistics over a trailing
//!    window of aligned records, projected into five price bands.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`acquire`] | Series acquisition, alignment and outcomes |
//! | [`adapters`] | FinMind and in-memory fixture sources |
//! | [`config`] | Environment-driven configuration |
//! | [`data_source`] | Data source trait and request types |
//! | [`domain`] | Dates, identifiers and aligned records |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`river`] | Rolling statistics and band projection |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use river_core::{Acquisition, FinmindAdapter, RiverParams, SeriesAcquirer, StockId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let acquirer = SeriesAcquirer::new(Arc::new(FinmindAdapter::default()));
//!     let stock_id = StockId::parse("2330")?;
//!
//!     match acquirer.acquire(&stock_id, 1825).await {
//!         Acquisition::Data(series) => {
//!             let river = river_core::transform(&series, RiverParams::default());
//!             if let Some(latest) = river.latest_defined() {
//!                 println!("{}: {:?}", latest.record.date, latest.zone());
//!             }
//!         }
//!         Acquisition::NoData(reason) => println!("no data: {reason}"),
//!         Acquisition::Failure(failure) => eprintln!("{failure}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Upstream faults never escape as panics or `Err`s from `acquire`; they
//! arrive as [`Acquisition::Failure`] carrying a structured [`SourceError`]:
//!
//! ```rust
//! use river_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::Timeout | SourceErrorKind::Unavailable => "try again later",
//!         SourceErrorKind::Decode => "upstream sent something unexpected",
//!         _ => "request failed",
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and installs no subscriber. The API token
//! is sent as a bearer header and never logged.

pub mod acquire;
pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod river;
pub mod source;

// Acquisition
pub use acquire::{
    align, Acquisition, AcquisitionFailure, NoDataReason, SeriesAcquirer, DEFAULT_LOOKBACK_DAYS,
};

// Adapter implementations
pub use adapters::{FinmindAdapter, FixtureSource, FINMIND_DEFAULT_BASE_URL};

// Configuration
pub use config::RiverConfig;

// Data source trait and types
pub use data_source::{
    DataSource, Dataset, SeriesRequest, SourceError, SourceErrorKind, SourceFuture,
};

// Domain models
pub use domain::{
    derive_eps, AlignedSeries, DatedRecord, MultiplePoint, PricePoint, StockId, TradingDate,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
    DEFAULT_TIMEOUT_MS,
};

// River transform
pub use river::{
    rolling_mean_std, transform, RiverBands, RiverParams, RiverRecord, RiverSeries, RollingStat,
    RollingWindow, ValuationZone,
};

// Source identifiers
pub use source::ProviderId;
