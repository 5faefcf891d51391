use serde::{Deserialize, Serialize};

use crate::{StockId, TradingDate, ValidationError};

/// Daily closing price row from the price dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradingDate,
    pub close_price: f64,
}

impl PricePoint {
    pub fn new(date: TradingDate, close_price: f64) -> Result<Self, ValidationError> {
        validate_positive("close_price", close_price)?;
        Ok(Self { date, close_price })
    }

    pub(crate) fn is_usable(&self) -> bool {
        self.close_price.is_finite() && self.close_price > 0.0
    }
}

/// Daily valuation-multiple row. Either multiple may be missing upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplePoint {
    pub date: TradingDate,
    pub per: Option<f64>,
    pub pbr: Option<f64>,
}

impl MultiplePoint {
    pub fn new(
        date: TradingDate,
        per: Option<f64>,
        pbr: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_finite("per", per)?;
        validate_optional_finite("pbr", pbr)?;
        Ok(Self { date, per, pbr })
    }

    /// Both multiples, when present and finite.
    pub(crate) fn complete(&self) -> Option<(f64, f64)> {
        match (self.per, self.pbr) {
            (Some(per), Some(pbr)) if per.is_finite() && pbr.is_finite() => Some((per, pbr)),
            _ => None,
        }
    }
}

/// Trailing earnings per share implied by a close price and its PER.
///
/// A non-positive PER (loss-making period) yields zero earnings rather than
/// a missing value, so band projections stay numerically defined.
pub fn derive_eps(close_price: f64, per: f64) -> f64 {
    if per > 0.0 {
        close_price / per
    } else {
        0.0
    }
}

/// One aligned trading date carrying both source series and derived EPS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedRecord {
    pub date: TradingDate,
    pub close_price: f64,
    pub per: f64,
    pub pbr: f64,
    pub eps: f64,
}

impl DatedRecord {
    pub fn derive(date: TradingDate, close_price: f64, per: f64, pbr: f64) -> Self {
        Self {
            date,
            close_price,
            per,
            pbr,
            eps: derive_eps(close_price, per),
        }
    }
}

/// Date-ordered records present in both the price and multiple series.
///
/// Dates are strictly increasing, so there are no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    stock_id: StockId,
    records: Vec<DatedRecord>,
}

impl AlignedSeries {
    /// Build a series from records that are already in strictly increasing date order.
    pub fn from_records(
        stock_id: StockId,
        records: Vec<DatedRecord>,
    ) -> Result<Self, ValidationError> {
        for pair in records.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(ValidationError::UnorderedDates {
                    previous: pair[0].date.to_string(),
                    next: pair[1].date.to_string(),
                });
            }
        }
        for record in &records {
            validate_positive("close_price", record.close_price)?;
            validate_optional_finite("per", Some(record.per))?;
            validate_optional_finite("pbr", Some(record.pbr))?;
        }

        Ok(Self { stock_id, records })
    }

    pub(crate) fn from_sorted_unchecked(stock_id: StockId, records: Vec<DatedRecord>) -> Self {
        Self { stock_id, records }
    }

    pub fn stock_id(&self) -> &StockId {
        &self.stock_id
    }

    pub fn records(&self) -> &[DatedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DatedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<TradingDate> {
        self.records.first().map(|record| record.date)
    }

    pub fn last_date(&self) -> Option<TradingDate> {
        self.records.last().map(|record| record.date)
    }

    pub fn into_records(self) -> Vec<DatedRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a AlignedSeries {
    type Item = &'a DatedRecord;
    type IntoIter = std::slice::Iter<'a, DatedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}
