//! # Domain Models
//!
//! Canonical types shared by the acquirer and the river transform.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockId`] | Validated security identifier |
//! | [`TradingDate`] | Day-granularity join key |
//! | [`PricePoint`] | Upstream closing price row |
//! | [`MultiplePoint`] | Upstream PER/PBR row |
//! | [`DatedRecord`] | Aligned row with derived EPS |
//! | [`AlignedSeries`] | Ordered, duplicate-free aligned rows |

mod date;
mod models;
mod stock_id;

pub use date::TradingDate;
pub use models::{derive_eps, AlignedSeries, DatedRecord, MultiplePoint, PricePoint};
pub use stock_id::StockId;
