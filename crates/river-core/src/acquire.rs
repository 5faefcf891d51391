//! Series acquisition: fetch, align and derive EPS.
//!
//! [`SeriesAcquirer`] turns two independent upstream queries into one
//! [`AlignedSeries`]. Empty upstream data and upstream faults are ordinary
//! outcomes reported through [`Acquisition`]; nothing is raised past this
//! boundary.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data_source::{DataSource, Dataset, SeriesRequest, SourceError, SourceErrorKind};
use crate::{
    AlignedSeries, DatedRecord, MultiplePoint, PricePoint, ProviderId, StockId, TradingDate,
};

/// Five calendar years.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365 * 5;

/// Why an acquisition produced no series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    EmptyPrices,
    EmptyMultiples,
    EmptyJoin,
}

impl NoDataReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyPrices => "upstream returned no price rows",
            Self::EmptyMultiples => "upstream returned no valuation-multiple rows",
            Self::EmptyJoin => "price and valuation-multiple series share no dates",
        }
    }
}

impl Display for NoDataReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fault raised while fetching or decoding one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionFailure {
    pub dataset: Dataset,
    pub source: ProviderId,
    pub error: SourceError,
}

impl AcquisitionFailure {
    pub const fn kind(&self) -> SourceErrorKind {
        self.error.kind()
    }
}

impl Display for AcquisitionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} acquisition failed: {}",
            self.source, self.dataset, self.error
        )
    }
}

impl std::error::Error for AcquisitionFailure {}

/// Outcome of [`SeriesAcquirer::acquire`].
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    Data(AlignedSeries),
    NoData(NoDataReason),
    Failure(AcquisitionFailure),
}

impl Acquisition {
    pub fn series(&self) -> Option<&AlignedSeries> {
        match self {
            Self::Data(series) => Some(series),
            _ => None,
        }
    }

    pub fn into_series(self) -> Option<AlignedSeries> {
        match self {
            Self::Data(series) => Some(series),
            _ => None,
        }
    }

    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }

    pub fn failure(&self) -> Option<&AcquisitionFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Fetches the price and multiple series for one security and aligns them.
#[derive(Clone)]
pub struct SeriesAcquirer {
    source: Arc<dyn DataSource>,
}

impl SeriesAcquirer {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    /// Acquire `[today - lookback_days, today]` using today's UTC date.
    pub async fn acquire(&self, stock_id: &StockId, lookback_days: u32) -> Acquisition {
        self.acquire_as_of(stock_id, lookback_days, TradingDate::today_utc())
            .await
    }

    /// Acquire `[today - lookback_days, today]` for an explicit `today`.
    pub async fn acquire_as_of(
        &self,
        stock_id: &StockId,
        lookback_days: u32,
        today: TradingDate,
    ) -> Acquisition {
        let source = self.source.id();
        let request = SeriesRequest::lookback(stock_id.clone(), today, lookback_days);
        debug!(
            %stock_id,
            %source,
            start_date = %request.start_date,
            end_date = %request.end_date,
            "acquiring price and valuation-multiple series"
        );

        let (prices, multiples) = tokio::join!(
            self.source.price_series(request.clone()),
            self.source.multiple_series(request)
        );

        let prices = match prices {
            Ok(prices) => prices,
            Err(error) => return self.fail(stock_id, Dataset::Price, error),
        };
        let multiples = match multiples {
            Ok(multiples) => multiples,
            Err(error) => return self.fail(stock_id, Dataset::ValuationMultiples, error),
        };

        if prices.is_empty() {
            return no_data(stock_id, NoDataReason::EmptyPrices);
        }
        if multiples.is_empty() {
            return no_data(stock_id, NoDataReason::EmptyMultiples);
        }

        let series = align(stock_id.clone(), &prices, &multiples);
        if series.is_empty() {
            return no_data(stock_id, NoDataReason::EmptyJoin);
        }

        debug!(
            %stock_id,
            price_rows = prices.len(),
            multiple_rows = multiples.len(),
            aligned_rows = series.len(),
            "aligned series"
        );
        Acquisition::Data(series)
    }

    fn fail(&self, stock_id: &StockId, dataset: Dataset, error: SourceError) -> Acquisition {
        let failure = AcquisitionFailure {
            dataset,
            source: self.source.id(),
            error,
        };
        warn!(
            %stock_id,
            dataset = %failure.dataset,
            code = failure.error.code(),
            error = failure.error.message(),
            "series acquisition failed"
        );
        Acquisition::Failure(failure)
    }
}

fn no_data(stock_id: &StockId, reason: NoDataReason) -> Acquisition {
    info!(%stock_id, reason = reason.as_str(), "no data for security");
    Acquisition::NoData(reason)
}

/// Inner-join prices and multiples on date and derive EPS.
///
/// Dates present in only one series are dropped. When a series repeats a
/// date the last usable row wins. Price rows without a positive, finite close
/// and multiple rows missing PER or PBR are skipped before the join.
pub fn align(stock_id: StockId, prices: &[PricePoint], multiples: &[MultiplePoint]) -> AlignedSeries {
    let mut closes = BTreeMap::new();
    let mut skipped_prices = 0usize;
    for point in prices {
        if point.is_usable() {
            closes.insert(point.date, point.close_price);
        } else {
            skipped_prices += 1;
        }
    }

    let mut ratios = BTreeMap::new();
    let mut skipped_multiples = 0usize;
    for point in multiples {
        match point.complete() {
            Some(ratio) => {
                ratios.insert(point.date, ratio);
            }
            None => skipped_multiples += 1,
        }
    }

    if skipped_prices > 0 || skipped_multiples > 0 {
        debug!(
            %stock_id,
            skipped_prices,
            skipped_multiples,
            "skipped incomplete upstream rows"
        );
    }

    let records = ratios
        .into_iter()
        .filter_map(|(date, (per, pbr))| {
            closes
                .get(&date)
                .map(|&close_price| DatedRecord::derive(date, close_price, per, pbr))
        })
        .collect();

    AlignedSeries::from_sorted_unchecked(stock_id, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> TradingDate {
        TradingDate::parse(raw).expect("valid date")
    }

    fn price(raw: &str, close: f64) -> PricePoint {
        PricePoint {
            date: date(raw),
            close_price: close,
        }
    }

    fn multiple(raw: &str, per: Option<f64>, pbr: Option<f64>) -> MultiplePoint {
        MultiplePoint {
            date: date(raw),
            per,
            pbr,
        }
    }

    fn stock() -> StockId {
        StockId::parse("2330").expect("valid")
    }

    #[test]
    fn keeps_only_shared_dates_in_order() {
        let prices = vec![
            price("2020-01-03", 103.0),
            price("2020-01-01", 100.0),
            price("2020-01-02", 110.0),
        ];
        let multiples = vec![
            multiple("2020-01-02", Some(11.0), Some(1.0)),
            multiple("2020-01-04", Some(12.0), Some(1.0)),
            multiple("2020-01-01", Some(10.0), Some(1.0)),
        ];

        let series = align(stock(), &prices, &multiples);
        let dates: Vec<String> = series.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2020-01-01", "2020-01-02"]);
    }

    #[test]
    fn last_duplicate_row_wins() {
        let prices = vec![price("2020-01-01", 100.0), price("2020-01-01", 105.0)];
        let multiples = vec![
            multiple("2020-01-01", Some(10.0), Some(1.0)),
            multiple("2020-01-01", Some(15.0), Some(1.5)),
        ];

        let series = align(stock(), &prices, &multiples);
        assert_eq!(series.len(), 1);
        let record = series.records()[0];
        assert_eq!(record.close_price, 105.0);
        assert_eq!(record.per, 15.0);
        assert_eq!(record.eps, 7.0);
    }

    #[test]
    fn skips_rows_that_cannot_be_aligned() {
        let prices = vec![price("2020-01-01", 0.0), price("2020-01-02", 50.0)];
        let multiples = vec![
            multiple("2020-01-01", Some(10.0), Some(1.0)),
            multiple("2020-01-02", None, Some(1.0)),
        ];

        assert!(align(stock(), &prices, &multiples).is_empty());
    }

    #[test]
    fn clamps_eps_for_loss_making_dates() {
        let prices = vec![price("2020-01-01", 40.0), price("2020-01-02", 42.0)];
        let multiples = vec![
            multiple("2020-01-01", Some(0.0), Some(0.8)),
            multiple("2020-01-02", Some(-6.0), Some(0.8)),
        ];

        let series = align(stock(), &prices, &multiples);
        assert!(series.iter().all(|record| record.eps == 0.0));
    }
}
