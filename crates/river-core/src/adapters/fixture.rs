use std::path::Path;

use serde::Deserialize;

use crate::data_source::{DataSource, SeriesRequest, SourceError, SourceFuture};
use crate::{CoreError, MultiplePoint, PricePoint, ProviderId};

/// In-memory source serving canned rows, for offline runs and tests.
///
/// Rows outside a request's date range are filtered out, the same as an
/// upstream query would.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    prices: Vec<PricePoint>,
    multiples: Vec<MultiplePoint>,
    price_error: Option<SourceError>,
    multiple_error: Option<SourceError>,
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    prices: Vec<PricePoint>,
    #[serde(default)]
    multiples: Vec<MultiplePoint>,
}

impl FixtureSource {
    pub fn new(prices: Vec<PricePoint>, multiples: Vec<MultiplePoint>) -> Self {
        Self {
            prices,
            multiples,
            ..Self::default()
        }
    }

    /// Parse `{"prices": [{date, close_price}], "multiples": [{date, per, pbr}]}`.
    pub fn from_json(input: &str) -> Result<Self, CoreError> {
        let file: FixtureFile = serde_json::from_str(input)?;
        Ok(Self::new(file.prices, file.multiples))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Make every price query fail with `error`.
    pub fn with_price_error(mut self, error: SourceError) -> Self {
        self.price_error = Some(error);
        self
    }

    /// Make every valuation-multiple query fail with `error`.
    pub fn with_multiple_error(mut self, error: SourceError) -> Self {
        self.multiple_error = Some(error);
        self
    }
}

impl DataSource for FixtureSource {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn price_series<'a>(&'a self, req: SeriesRequest) -> SourceFuture<'a, Vec<PricePoint>> {
        Box::pin(async move {
            if let Some(error) = &self.price_error {
                return Err(error.clone());
            }
            Ok(self
                .prices
                .iter()
                .filter(|point| req.contains(point.date))
                .copied()
                .collect())
        })
    }

    fn multiple_series<'a>(&'a self, req: SeriesRequest) -> SourceFuture<'a, Vec<MultiplePoint>> {
        Box::pin(async move {
            if let Some(error) = &self.multiple_error {
                return Err(error.clone());
            }
            Ok(self
                .multiples
                .iter()
                .filter(|point| req.contains(point.date))
                .copied()
                .collect())
        })
    }
}
