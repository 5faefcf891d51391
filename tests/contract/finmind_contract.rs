use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use river_core::{
    Acquisition, DataSource, Dataset, FinmindAdapter, HttpClient, HttpError, HttpRequest,
    HttpResponse, SeriesAcquirer, SeriesRequest, SourceErrorKind, StockId, TradingDate,
};

const PRICE_BODY: &str = r#"{
  "msg": "success",
  "status": 200,
  "data": [
    {"date": "2024-01-02", "stock_id": "2330", "Trading_Volume": 26059058, "open": 590.0, "max": 593.0, "min": 589.0, "close": 593.0, "spread": 0.0},
    {"date": "2024-01-03", "stock_id": "2330", "Trading_Volume": 37106763, "open": 584.0, "max": 585.0, "min": 576.0, "close": 578.0, "spread": -15.0},
    {"date": "2024-01-04", "stock_id": "2330", "Trading_Volume": 15309129, "open": 580.0, "max": 583.0, "min": 576.0, "close": 580.0, "spread": 2.0}
  ]
}"#;

const PER_BODY: &str = r#"{
  "msg": "success",
  "status": 200,
  "data": [
    {"date": "2024-01-02", "stock_id": "2330", "dividend_yield": 2.19, "PER": 15.94, "PBR": 4.56},
    {"date": "2024-01-04", "stock_id": "2330", "dividend_yield": 2.24, "PER": 15.59, "PBR": 4.46}
  ]
}"#;

/// Canned transport that answers by dataset and records every request.
struct CannedHttpClient {
    price: Option<Result<HttpResponse, HttpError>>,
    per: Option<Result<HttpResponse, HttpError>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    fn new(
        price: Result<HttpResponse, HttpError>,
        per: Result<HttpResponse, HttpError>,
    ) -> Self {
        Self {
            price: Some(price),
            per: Some(per),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let dataset = request.query_value("dataset").map(str::to_owned);
        self.requests.lock().expect("lock").push(request);
        let answer = match dataset.as_deref() {
            Some("TaiwanStockPrice") => self.price.clone(),
            Some("TaiwanStockPER") => self.per.clone(),
            _ => None,
        }
        .unwrap_or_else(|| Err(HttpError::new("unexpected dataset")));
        Box::pin(async move { answer })
    }
}

fn request() -> SeriesRequest {
    SeriesRequest::new(
        StockId::parse("2330").expect("valid"),
        TradingDate::parse("2024-01-01").expect("valid"),
        TradingDate::parse("2024-01-05").expect("valid"),
    )
    .expect("valid request")
}

#[tokio::test]
async fn builds_dataset_queries_with_bearer_token_and_timeout() {
    let client = Arc::new(CannedHttpClient::new(
        Ok(HttpResponse::ok_json(PRICE_BODY)),
        Ok(HttpResponse::ok_json(PER_BODY)),
    ));
    let adapter = FinmindAdapter::new(client.clone())
        .with_token("token-abc")
        .with_timeout_ms(4_000);

    adapter.price_series(request()).await.expect("prices");
    adapter.multiple_series(request()).await.expect("multiples");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    let price = &requests[0];
    assert_eq!(price.query_value("dataset"), Some("TaiwanStockPrice"));
    assert_eq!(price.query_value("data_id"), Some("2330"));
    assert_eq!(price.query_value("start_date"), Some("2024-01-01"));
    assert_eq!(price.query_value("end_date"), Some("2024-01-05"));
    assert_eq!(price.timeout_ms, 4_000);
    assert_eq!(
        price.headers.get("authorization").map(String::as_str),
        Some("Bearer token-abc")
    );
    assert!(!price.full_url().contains("token-abc"));
    assert_eq!(requests[1].query_value("dataset"), Some("TaiwanStockPER"));
}

#[tokio::test]
async fn decodes_finmind_rows_into_domain_points() {
    let client = Arc::new(CannedHttpClient::new(
        Ok(HttpResponse::ok_json(PRICE_BODY)),
        Ok(HttpResponse::ok_json(PER_BODY)),
    ));
    let adapter = FinmindAdapter::new(client);

    let prices = adapter.price_series(request()).await.expect("prices");
    let multiples = adapter.multiple_series(request()).await.expect("multiples");

    assert_eq!(prices.len(), 3);
    assert_eq!(prices[1].close_price, 578.0);
    assert_eq!(multiples.len(), 2);
    assert_eq!(multiples[0].per, Some(15.94));
    assert_eq!(multiples[1].pbr, Some(4.46));
}

#[tokio::test]
async fn acquisition_through_finmind_aligns_on_shared_dates() {
    let client = Arc::new(CannedHttpClient::new(
        Ok(HttpResponse::ok_json(PRICE_BODY)),
        Ok(HttpResponse::ok_json(PER_BODY)),
    ));
    let acquirer = SeriesAcquirer::new(Arc::new(FinmindAdapter::new(client)));

    let outcome = acquirer
        .acquire_as_of(
            &StockId::parse("2330").expect("valid"),
            1825,
            TradingDate::parse("2024-01-05").expect("valid"),
        )
        .await;

    let series = outcome.into_series().expect("aligned data");
    assert_eq!(series.len(), 2);
    assert_eq!(series.records()[0].eps, 593.0 / 15.94);
    assert_eq!(series.last_date(), TradingDate::parse("2024-01-04").ok());
}

#[tokio::test]
async fn empty_data_array_is_no_data() {
    let client = Arc::new(CannedHttpClient::new(
        Ok(HttpResponse::ok_json(r#"{"msg":"success","status":200,"data":[]}"#)),
        Ok(HttpResponse::ok_json(PER_BODY)),
    ));
    let acquirer = SeriesAcquirer::new(Arc::new(FinmindAdapter::new(client)));

    let outcome = acquirer
        .acquire(&StockId::parse("9999").expect("valid"), 1825)
        .await;

    assert!(matches!(outcome, Acquisition::NoData(_)));
}

#[tokio::test]
async fn timeout_surfaces_as_timeout_failure() {
    let client = Arc::new(CannedHttpClient::new(
        Ok(HttpResponse::ok_json(PRICE_BODY)),
        Err(HttpError::timeout("request timeout: operation timed out")),
    ));
    let acquirer = SeriesAcquirer::new(Arc::new(FinmindAdapter::new(client)));

    let outcome = acquirer
        .acquire(&StockId::parse("2330").expect("valid"), 1825)
        .await;

    let failure = outcome.failure().expect("failure outcome");
    assert_eq!(failure.dataset, Dataset::ValuationMultiples);
    assert_eq!(failure.kind(), SourceErrorKind::Timeout);
    assert!(failure.error.retryable());
}

#[tokio::test]
async fn upstream_error_status_in_body_is_a_failure() {
    let client = Arc::new(CannedHttpClient::new(
        Ok(HttpResponse::ok_json(
            r#"{"msg":"Requests reach the upper limit.","status":402}"#,
        )),
        Ok(HttpResponse::ok_json(PER_BODY)),
    ));
    let adapter = FinmindAdapter::new(client);

    let error = adapter.price_series(request()).await.expect_err("must fail");
    assert_eq!(error.kind(), SourceErrorKind::Upstream);
    assert!(error.message().contains("402"));
    assert!(error.message().contains("upper limit"));
}

#[tokio::test]
async fn http_error_status_is_a_failure() {
    let client = Arc::new(CannedHttpClient::new(
        Ok(HttpResponse {
            status: 502,
            body: String::from("<html>bad gateway</html>"),
        }),
        Ok(HttpResponse::ok_json(PER_BODY)),
    ));
    let adapter = FinmindAdapter::new(client);

    let error = adapter.price_series(request()).await.expect_err("must fail");
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
}

#[tokio::test]
async fn malformed_payloads_are_decode_failures() {
    let cases = [
        "not json",
        r#"{"msg":"success","status":200}"#,
        r#"{"msg":"success","status":200,"data":[{"date":"2024/01/02","PER":1.0,"PBR":1.0}]}"#,
    ];

    for body in cases {
        let client = Arc::new(CannedHttpClient::new(
            Ok(HttpResponse::ok_json(PRICE_BODY)),
            Ok(HttpResponse::ok_json(body)),
        ));
        let acquirer = SeriesAcquirer::new(Arc::new(FinmindAdapter::new(client)));

        let outcome = acquirer
            .acquire(&StockId::parse("2330").expect("valid"), 1825)
            .await;

        let failure = outcome
            .failure()
            .unwrap_or_else(|| panic!("body {body:?} should fail"));
        assert_eq!(failure.kind(), SourceErrorKind::Decode, "body {body:?}");
    }
}
