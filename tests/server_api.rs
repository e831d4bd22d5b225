use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use finrisk::{create_router, AppConfig, AppState, GeneratorConfig, SyntheticMarketData};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: AppConfig) -> Router {
    let provider = SyntheticMarketData::new(GeneratorConfig::seeded(7))
        .with_as_of(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
    create_router(Arc::new(AppState::new(Arc::new(provider), config)))
}

fn app() -> Router {
    app_with(AppConfig::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), disposition)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body, _) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn post_report(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/reports")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body, _) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn tickers_lists_catalog_and_presets() {
    let (status, body) = get(&app(), "/tickers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stocks"][0]["symbol"], "AAPL");
    assert_eq!(body["presets"][0]["name"], "tech");
    assert_eq!(body["periods"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn stock_endpoint_returns_series_and_stats() {
    let (status, body) = get(&app(), "/stocks/aapl?period=3mo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "AAPL");
    assert_eq!(body["period"], "3mo");
    assert_eq!(body["name"], "Apple Inc.");

    let bars = body["bars"].as_array().unwrap();
    assert!(!bars.is_empty());
    assert_eq!(body["returns"].as_array().unwrap().len(), bars.len() - 1);
    assert!(body["price_stats"]["current_price"].as_f64().unwrap() > 0.0);
    assert!(body["performance"]["annual_volatility"].is_number());
    assert_eq!(body["histogram"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn seeded_requests_keep_the_anchor_date() {
    let app = app();
    for uri in ["/stocks/AAPL?period=1mo", "/stocks/AAPL?period=1mo&seed=3"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        let bars = body["bars"].as_array().unwrap();
        assert_eq!(bars.last().unwrap()["date"], "2024-06-28", "{}", uri);
    }

    let (_, risk) = get(&app, "/risk/SPY?seed=3").await;
    let returns = risk["returns"].as_array().unwrap();
    assert_eq!(returns.last().unwrap()["date"], "2024-06-28");
}

#[tokio::test]
async fn stock_endpoint_rejects_bad_input() {
    let (status, body) = get(&app(), "/stocks/AAPL?period=7y").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidParameter");

    let (status, body) = get(&app(), "/stocks/BAD!TICKER").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("BAD!TICKER"));
}

#[tokio::test]
async fn stock_csv_download() {
    let request = Request::builder()
        .uri("/stocks/MSFT/export.csv?period=1mo")
        .body(Body::empty())
        .unwrap();
    let (status, body, disposition) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("date,open,high,low,close,volume\n"));
    assert!(disposition.unwrap().contains("MSFT_1mo_"));
}

#[tokio::test]
async fn portfolio_from_preset_and_custom_weights() {
    let (status, body) = get(&app(), "/portfolio?preset=stable&days=120").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allocation"].as_array().unwrap().len(), 5);
    assert_eq!(body["days"], 120);
    assert!(body["metrics"]["max_drawdown"].as_f64().unwrap() <= 0.0);

    let (status, body) =
        get(&app(), "/portfolio?tickers=AAPL,MSFT&weights=3,1&days=60").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allocation"][0]["weight"], 0.75);
    assert_eq!(body["correlation"]["values"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn portfolio_validation_errors() {
    let app = app();
    let (status, _) = get(&app, "/portfolio?tickers=AAPL,MSFT&weights=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/portfolio?tickers=AAPL,AAPL").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/portfolio?preset=crypto").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/portfolio?days=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn risk_endpoint_computes_metrics() {
    let (status, body) = get(&app(), "/risk/TSLA?confidence=0.99&lookback=500&risk_free=0.03").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lookback"], 500);
    assert_eq!(body["returns"].as_array().unwrap().len(), 500);

    let metrics = &body["metrics"];
    assert_eq!(metrics["confidence"], 0.99);
    assert_eq!(metrics["risk_free_rate"], 0.03);
    assert!(metrics["cvar"].as_f64().unwrap() <= metrics["var"].as_f64().unwrap());
    assert_eq!(body["rows"][1]["metric"], "VaR (99%)");
}

#[tokio::test]
async fn risk_endpoint_enforces_control_bounds() {
    let app = app();
    let (status, body) = get(&app, "/risk/SPY?confidence=0.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidParameter");

    let (status, _) = get(&app, "/risk/SPY?lookback=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/risk/SPY?lookback=2000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/risk/SPY?risk_free=0.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn risk_csv_download() {
    let request = Request::builder()
        .uri("/risk/AAPL/export.csv")
        .body(Body::empty())
        .unwrap();
    let (status, body, disposition) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("metric,value\n"));
    assert!(text.contains("VaR (95%)"));
    assert!(disposition.unwrap().contains("AAPL_risk_metrics_"));
}

#[tokio::test]
async fn report_lifecycle() {
    let app = app();

    let (status, body) = get(&app, "/reports/templates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["templates"].as_array().unwrap().len(), 4);
    assert_eq!(body["report_types"].as_array().unwrap().len(), 4);

    let (status, created) = post_report(
        &app,
        json!({
            "report_type": "risk",
            "client_name": "Jane <Doe>",
            "report_date": "2024-07-01",
            "formats": { "excel": false },
            "seed": 42
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["number"].as_str().unwrap().starts_with("FR-"));
    let downloads = created["downloads"].as_array().unwrap();
    assert_eq!(downloads.len(), 2);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, report) = get(&app, &format!("/reports/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["request"]["company_name"], "FinRisk Pro Analytics");
    assert_eq!(report["data"]["stocks"].as_array().unwrap().len(), 10);

    let (status, history) = get(&app, "/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["reports"][0]["id"], id.as_str());

    let request = Request::builder()
        .uri(format!("/reports/{}/download/html", id))
        .body(Body::empty())
        .unwrap();
    let (status, body, disposition) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Jane &lt;Doe&gt;"));
    assert!(disposition
        .unwrap()
        .contains("Risk_Assessment_Report_2024-07-01.html"));

    let request = Request::builder()
        .uri(format!("/reports/{}/download/txt", id))
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body)
        .unwrap()
        .starts_with("Risk Assessment Report"));

    let (status, body) = get(&app, &format!("/reports/{}/download/xlsx", id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidParameter");

    let (status, _) = get(&app, &format!("/reports/{}/download/pdf", id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_report_is_not_found() {
    let (status, body) = get(&app(), "/reports/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ReportNotFound");
}

#[tokio::test]
async fn invalid_report_request_is_rejected() {
    let (status, body) = post_report(&app(), json!({ "client_email": "nobody" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidParameter");
}

#[tokio::test]
async fn report_history_is_bounded() {
    let config = AppConfig {
        report_history: 2,
        ..AppConfig::default()
    };
    let app = app_with(config);

    let mut ids = Vec::new();
    for seed in 0..3 {
        let (status, created) = post_report(&app, json!({ "seed": seed })).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let (_, history) = get(&app, "/reports").await;
    let listed: Vec<&str> = history["reports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str()]);

    let (status, _) = get(&app, &format!("/reports/{}", ids[0])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
