use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::RiverConfig;
use crate::data_source::{DataSource, Dataset, SeriesRequest, SourceError, SourceFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{MultiplePoint, PricePoint, ProviderId, TradingDate};

pub const FINMIND_DEFAULT_BASE_URL: &str = "https://api.finmindtrade.com/api/v4/data";

/// FinMind v4 `data` endpoint adapter.
///
/// The credential and transport are supplied at construction; the adapter
/// keeps no global state and never retries.
#[derive(Clone)]
pub struct FinmindAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    timeout_ms: u64,
}

impl Default for FinmindAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl FinmindAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(FINMIND_DEFAULT_BASE_URL),
            auth: HttpAuth::None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn from_config(config: &RiverConfig) -> Self {
        Self::default()
            .with_base_url(config.base_url.clone())
            .with_auth(HttpAuth::from_token(config.token.clone()))
            .with_timeout_ms(config.timeout_ms)
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_auth(HttpAuth::from_token(Some(token.into())))
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn build_request(&self, dataset: Dataset, req: &SeriesRequest) -> HttpRequest {
        HttpRequest::get(&self.base_url)
            .with_query("dataset", dataset.upstream_name())
            .with_query("data_id", req.stock_id.as_str())
            .with_query("start_date", req.start_date.to_string())
            .with_query("end_date", req.end_date.to_string())
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        dataset: Dataset,
        req: &SeriesRequest,
    ) -> Result<Vec<T>, SourceError> {
        let request = self.build_request(dataset, req);
        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.is_timeout() {
                SourceError::timeout(format!(
                    "finmind {dataset} request timed out: {}",
                    error.message()
                ))
            } else {
                SourceError::unavailable(format!(
                    "finmind transport error: {}",
                    error.message()
                ))
            }
        })?;

        if !response.is_success() {
            return Err(status_error(dataset, response.status, None));
        }

        let envelope: FinmindEnvelope<T> = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::decode(format!("failed to parse finmind {dataset} response: {e}"))
        })?;

        if let Some(status) = envelope.status {
            if status != 200 {
                return Err(status_error(dataset, status, envelope.msg));
            }
        }

        envelope.data.ok_or_else(|| {
            SourceError::decode(format!("finmind {dataset} response has no data field"))
        })
    }

    async fn fetch_prices(&self, req: &SeriesRequest) -> Result<Vec<PricePoint>, SourceError> {
        let rows: Vec<FinmindPriceRow> = self.fetch_rows(Dataset::Price, req).await?;
        let total = rows.len();

        let mut points = Vec::with_capacity(total);
        for row in rows {
            let date = parse_row_date(Dataset::Price, &row.date)?;
            if let Some(point) = row.close.and_then(|close| PricePoint::new(date, close).ok()) {
                points.push(point);
            }
        }

        if points.len() < total {
            debug!(
                stock_id = %req.stock_id,
                skipped = total - points.len(),
                "dropped finmind price rows without a usable close"
            );
        }
        Ok(points)
    }

    async fn fetch_multiples(&self, req: &SeriesRequest) -> Result<Vec<MultiplePoint>, SourceError> {
        let rows: Vec<FinmindMultipleRow> =
            self.fetch_rows(Dataset::ValuationMultiples, req).await?;

        rows.into_iter()
            .map(|row| {
                let date = parse_row_date(Dataset::ValuationMultiples, &row.date)?;
                MultiplePoint::new(date, row.per, row.pbr)
                    .map_err(|e| SourceError::decode(format!("invalid finmind multiple row: {e}")))
            })
            .collect()
    }
}

impl DataSource for FinmindAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Finmind
    }

    fn price_series<'a>(&'a self, req: SeriesRequest) -> SourceFuture<'a, Vec<PricePoint>> {
        Box::pin(async move { self.fetch_prices(&req).await })
    }

    fn multiple_series<'a>(&'a self, req: SeriesRequest) -> SourceFuture<'a, Vec<MultiplePoint>> {
        Box::pin(async move { self.fetch_multiples(&req).await })
    }
}

fn parse_row_date(dataset: Dataset, raw: &str) -> Result<TradingDate, SourceError> {
    TradingDate::parse(raw)
        .map_err(|e| SourceError::decode(format!("invalid finmind {dataset} row: {e}")))
}

fn status_error(dataset: Dataset, status: u16, msg: Option<String>) -> SourceError {
    let detail = msg
        .filter(|msg| !msg.trim().is_empty())
        .map(|msg| format!(": {msg}"))
        .unwrap_or_default();
    let message = format!("finmind {dataset} request returned status {status}{detail}");

    match status {
        500..=599 => SourceError::unavailable(message),
        // 402 is FinMind's per-hour quota signal.
        402 | 429 => SourceError::upstream(message, true),
        _ => SourceError::upstream(message, false),
    }
}

#[derive(Debug, Deserialize)]
struct FinmindEnvelope<T> {
    msg: Option<String>,
    status: Option<u16>,
    data: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct FinmindPriceRow {
    date: String,
    #[serde(alias = "close_price")]
    close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FinmindMultipleRow {
    date: String,
    #[serde(rename = "PER")]
    per: Option<f64>,
    #[serde(rename = "PBR")]
    pbr: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;

    #[test]
    fn quota_status_is_retryable_upstream_error() {
        let error = status_error(Dataset::Price, 402, Some(String::from("Requests reach the upper limit")));
        assert_eq!(error.kind(), SourceErrorKind::Upstream);
        assert!(error.retryable());
        assert!(error.message().contains("upper limit"));
    }

    #[test]
    fn server_errors_map_to_unavailable() {
        let error = status_error(Dataset::ValuationMultiples, 503, None);
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert_eq!(
            error.message(),
            "finmind valuation_multiples request returned status 503"
        );
    }

    #[test]
    fn price_rows_accept_either_close_field_name() {
        let rows: Vec<FinmindPriceRow> = serde_json::from_str(
            r#"[{"date":"2024-01-02","close":593.0},{"date":"2024-01-03","close_price":578.0}]"#,
        )
        .expect("rows parse");
        assert_eq!(rows[0].close, Some(593.0));
        assert_eq!(rows[1].close, Some(578.0));
    }
}
