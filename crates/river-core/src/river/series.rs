use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::RiverParams;
use crate::{DatedRecord, StockId};

/// The five price-space valuation bands for one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiverBands {
    pub high_2sd: f64,
    pub high_1sd: f64,
    pub mean: f64,
    pub low_1sd: f64,
    pub low_2sd: f64,
}

impl RiverBands {
    /// Project PER mean ± k·std into price units through `eps`.
    pub fn project(eps: f64, pe_mean: f64, pe_std: f64) -> Self {
        Self {
            high_2sd: eps * (pe_mean + 2.0 * pe_std),
            high_1sd: eps * (pe_mean + pe_std),
            mean: eps * pe_mean,
            low_1sd: eps * (pe_mean - pe_std),
            low_2sd: eps * (pe_mean - 2.0 * pe_std),
        }
    }
}

/// An aligned record extended with rolling PER statistics and bands.
///
/// Statistics and bands are `None` until enough history has accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiverRecord {
    #[serde(flatten)]
    pub record: DatedRecord,
    pub pe_mean: Option<f64>,
    pub pe_std: Option<f64>,
    pub river_high_2sd: Option<f64>,
    pub river_high_1sd: Option<f64>,
    pub river_mean: Option<f64>,
    pub river_low_1sd: Option<f64>,
    pub river_low_2sd: Option<f64>,
}

impl RiverRecord {
    pub(crate) fn new(record: DatedRecord, pe_mean: Option<f64>, pe_std: Option<f64>) -> Self {
        let bands = match (pe_mean, pe_std) {
            (Some(mean), Some(std)) => Some(RiverBands::project(record.eps, mean, std)),
            _ => None,
        };
        Self {
            record,
            pe_mean,
            pe_std,
            river_high_2sd: bands.map(|b| b.high_2sd),
            river_high_1sd: bands.map(|b| b.high_1sd),
            river_mean: bands.map(|b| b.mean),
            river_low_1sd: bands.map(|b| b.low_1sd),
            river_low_2sd: bands.map(|b| b.low_2sd),
        }
    }

    pub fn bands(&self) -> Option<RiverBands> {
        Some(RiverBands {
            high_2sd: self.river_high_2sd?,
            high_1sd: self.river_high_1sd?,
            mean: self.river_mean?,
            low_1sd: self.river_low_1sd?,
            low_2sd: self.river_low_2sd?,
        })
    }

    /// Where the close price sits inside the river.
    ///
    /// `None` while bands are undefined, and for zero-EPS records whose bands
    /// all collapse to zero.
    pub fn zone(&self) -> Option<ValuationZone> {
        if self.record.eps <= 0.0 {
            return None;
        }
        self.bands()
            .map(|bands| ValuationZone::classify(self.record.close_price, &bands))
    }
}

/// Position of a price relative to the river bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationZone {
    BelowLow2Sd,
    Low2SdToLow1Sd,
    Low1SdToMean,
    MeanToHigh1Sd,
    High1SdToHigh2Sd,
    AboveHigh2Sd,
}

impl ValuationZone {
    pub fn classify(price: f64, bands: &RiverBands) -> Self {
        if price < bands.low_2sd {
            Self::BelowLow2Sd
        } else if price < bands.low_1sd {
            Self::Low2SdToLow1Sd
        } else if price < bands.mean {
            Self::Low1SdToMean
        } else if price < bands.high_1sd {
            Self::MeanToHigh1Sd
        } else if price < bands.high_2sd {
            Self::High1SdToHigh2Sd
        } else {
            Self::AboveHigh2Sd
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BelowLow2Sd => "below_low_2sd",
            Self::Low2SdToLow1Sd => "low_2sd_to_low_1sd",
            Self::Low1SdToMean => "low_1sd_to_mean",
            Self::MeanToHigh1Sd => "mean_to_high_1sd",
            Self::High1SdToHigh2Sd => "high_1sd_to_high_2sd",
            Self::AboveHigh2Sd => "above_high_2sd",
        }
    }
}

impl Display for ValuationZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An aligned series with river statistics appended to every record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverSeries {
    pub stock_id: StockId,
    pub params: RiverParams,
    pub records: Vec<RiverRecord>,
}

impl RiverSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RiverRecord> {
        self.records.iter()
    }

    /// Number of records whose bands are defined.
    pub fn defined_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.river_mean.is_some())
            .count()
    }

    /// Most recent record with defined bands.
    pub fn latest_defined(&self) -> Option<&RiverRecord> {
        self.records
            .iter()
            .rev()
            .find(|record| record.river_mean.is_some())
    }
}
