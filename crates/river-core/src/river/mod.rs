//! # Valuation River
//!
//! Rolling PER statistics projected back into price space.
//!
//! For every aligned record `i`, the sample mean and sample standard deviation
//! of PER are taken over the trailing `window` records ending at `i`. Positions
//! with fewer than `min_periods` samples carry no statistics. Where defined:
//!
//! ```text
//! river_high_2sd = eps * (pe_mean + 2 * pe_std)
//! river_high_1sd = eps * (pe_mean + pe_std)
//! river_mean     = eps * pe_mean
//! river_low_1sd  = eps * (pe_mean - pe_std)
//! river_low_2sd  = eps * (pe_mean - 2 * pe_std)
//! ```
//!
//! PER is used raw: no smoothing, outlier rejection or winsorization.

mod rolling;
mod series;

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

pub use rolling::{rolling_mean_std, RollingStat, RollingWindow};
pub use series::{RiverBands, RiverRecord, RiverSeries, ValuationZone};

use crate::{AlignedSeries, ValidationError};

/// Trading days per year used to size the window.
pub const TRADING_DAYS_PER_YEAR: usize = 240;
/// Three trading years of aligned records.
pub const DEFAULT_WINDOW: usize = TRADING_DAYS_PER_YEAR * 3;
pub const DEFAULT_MIN_PERIODS: usize = 200;

const DEFAULT_WINDOW_SIZE: NonZeroUsize = match NonZeroUsize::new(DEFAULT_WINDOW) {
    Some(window) => window,
    None => panic!("default window must be non-zero"),
};

/// Rolling window configuration. The window counts aligned records, not calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRiverParams")]
pub struct RiverParams {
    window: NonZeroUsize,
    min_periods: usize,
}

#[derive(Deserialize)]
struct RawRiverParams {
    window: usize,
    min_periods: usize,
}

impl TryFrom<RawRiverParams> for RiverParams {
    type Error = ValidationError;

    fn try_from(raw: RawRiverParams) -> Result<Self, Self::Error> {
        Self::new(raw.window, raw.min_periods)
    }
}

impl RiverParams {
    pub fn new(window: usize, min_periods: usize) -> Result<Self, ValidationError> {
        let Some(window_size) = NonZeroUsize::new(window) else {
            return Err(ValidationError::ZeroWindow);
        };
        if min_periods == 0 || min_periods > window {
            return Err(ValidationError::InvalidMinPeriods {
                min_periods,
                window,
            });
        }
        Ok(Self {
            window: window_size,
            min_periods,
        })
    }

    pub const fn window(self) -> usize {
        self.window.get()
    }

    pub const fn window_size(self) -> NonZeroUsize {
        self.window
    }

    pub const fn min_periods(self) -> usize {
        self.min_periods
    }
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW_SIZE,
            min_periods: DEFAULT_MIN_PERIODS,
        }
    }
}

/// Compute the river for an aligned series.
///
/// Never fails: output has the input's length and order, with leading
/// records left undefined until `min_periods` samples are available.
pub fn transform(series: &AlignedSeries, params: RiverParams) -> RiverSeries {
    let per: Vec<f64> = series.iter().map(|record| record.per).collect();
    let stats = rolling_mean_std(&per, params);

    let records = series
        .iter()
        .zip(stats)
        .map(|(record, stat)| match stat {
            Some(stat) => RiverRecord::new(*record, Some(stat.mean), stat.std),
            None => RiverRecord::new(*record, None, None),
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        stock_id = %series.stock_id(),
        records = records.len(),
        window = params.window(),
        min_periods = params.min_periods(),
        "computed valuation river"
    );

    RiverSeries {
        stock_id: series.stock_id().clone(),
        params,
        records,
    }
}

impl RiverSeries {
    pub fn from_aligned(series: &AlignedSeries, params: RiverParams) -> Self {
        transform(series, params)
    }
}
