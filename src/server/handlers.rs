//! HTTP request handlers for API endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;
use crate::analytics::{
    histogram, HistogramBin, PerformanceSummary, PriceStats, RiskMetrics, RiskParams,
    MIN_OBSERVATIONS,
};
use crate::config::{APP_TITLE, APP_VERSION, CONFIDENCE_RANGE, LOOKBACK_RANGE, RISK_FREE_RANGE};
use crate::export::{metrics_csv, price_series_csv, render_report};
use crate::portfolio::{PortfolioAnalysis, Weights};
use crate::report::{
    Report, ReportFormat, ReportRequest, ReportSummary, ReportTemplate, ReportType, TEMPLATES,
};
use crate::ticker::{PortfolioPreset, SymbolClass, Ticker, HOT_RISK_ASSETS, HOT_STOCKS, SAMPLE_STOCKS};
use crate::time_series::{Lookback, Period, PriceBar, ReturnPoint};

/// Buckets in the return distribution charts.
const HISTOGRAM_BINS: usize = 50;

/// Health check endpoint
///
/// Returns a simple status response to verify the server is running
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "app": APP_TITLE,
        "version": APP_VERSION,
    }))
}

// Catalog

#[derive(Debug, Serialize)]
pub struct TickerInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub class: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PresetInfo {
    pub name: PortfolioPreset,
    pub tickers: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct TickersResponse {
    pub stocks: Vec<TickerInfo>,
    pub hot_stocks: &'static [&'static str],
    pub hot_risk_assets: &'static [&'static str],
    pub presets: Vec<PresetInfo>,
    pub periods: Vec<&'static str>,
}

/// GET /tickers - Catalog of sample tickers, presets and periods
pub async fn list_tickers() -> Json<TickersResponse> {
    let stocks = SAMPLE_STOCKS
        .iter()
        .map(|&(symbol, name)| TickerInfo {
            symbol,
            name,
            class: SymbolClass::classify(symbol).as_str(),
        })
        .collect();

    Json(TickersResponse {
        stocks,
        hot_stocks: HOT_STOCKS,
        hot_risk_assets: HOT_RISK_ASSETS,
        presets: PortfolioPreset::ALL
            .iter()
            .map(|preset| PresetInfo {
                name: *preset,
                tickers: preset.symbols(),
            })
            .collect(),
        periods: Period::ALL.iter().map(Period::label).collect(),
    })
}

// Single stock

/// Query parameters for the stock endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StockParams {
    /// One of 1mo, 3mo, 6mo, 1y, 2y, 5y (default 1y)
    pub period: Option<String>,
    pub seed: Option<u64>,
}

impl StockParams {
    fn period(&self) -> Result<Period, ApiError> {
        match &self.period {
            None => Ok(Period::default()),
            Some(label) => Period::parse(label).ok_or_else(|| {
                ApiError::InvalidParameter(format!(
                    "period must be one of {}",
                    Period::ALL.map(|p| p.label()).join(", ")
                ))
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub ticker: Ticker,
    pub name: Option<&'static str>,
    pub period: Period,
    pub price_stats: PriceStats,
    /// Absent when the window holds a single bar
    pub performance: Option<PerformanceSummary>,
    pub bars: Vec<PriceBar>,
    pub returns: Vec<ReturnPoint>,
    pub histogram: Vec<HistogramBin>,
}

/// GET /stocks/{ticker} - Price history and summary statistics
pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<StockParams>,
) -> Result<Json<StockResponse>, ApiError> {
    let ticker = Ticker::new(&symbol)?;
    let period = params.period()?;

    let provider = state.provider_for(params.seed);
    let series = provider.price_series(&ticker, Lookback::Period(period))?;
    let price_stats = PriceStats::from_series(&series)?;
    let returns = series.returns();
    let values = returns.values();
    let performance = if values.is_empty() {
        None
    } else {
        Some(PerformanceSummary::from_returns(&values)?)
    };

    info!(ticker = %ticker, period = %period, bars = series.len(), "stock analysed");

    Ok(Json(StockResponse {
        name: ticker.display_name(),
        histogram: histogram(&values, HISTOGRAM_BINS),
        ticker,
        period,
        price_stats,
        performance,
        bars: series.bars,
        returns: returns.points,
    }))
}

/// GET /stocks/{ticker}/export.csv - Price history as CSV
pub async fn export_stock_csv(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<StockParams>,
) -> Result<Response, ApiError> {
    let ticker = Ticker::new(&symbol)?;
    let period = params.period()?;
    let series = state
        .provider_for(params.seed)
        .price_series(&ticker, Lookback::Period(period))?;
    let bytes = price_series_csv(&series)?;
    let file_name = format!(
        "{}_{}_{}.csv",
        ticker,
        period.label(),
        Utc::now().format("%Y%m%d")
    );
    Ok(attachment("text/csv; charset=utf-8", &file_name, bytes))
}

// Portfolio

/// Query parameters for the portfolio endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PortfolioParams {
    /// Comma-separated tickers
    pub tickers: Option<String>,
    /// Named preset, used when `tickers` is absent
    pub preset: Option<String>,
    /// Comma-separated weights matching `tickers`; equal weights when absent
    pub weights: Option<String>,
    /// Business days of history (default from configuration)
    pub days: Option<usize>,
    pub seed: Option<u64>,
}

impl PortfolioParams {
    fn weights(&self) -> Result<Weights, ApiError> {
        let tickers = match (&self.tickers, &self.preset) {
            (Some(list), _) => split_list(list)
                .map(Ticker::new)
                .collect::<Result<Vec<_>, _>>()?,
            (None, Some(name)) => PortfolioPreset::parse(name)
                .ok_or_else(|| {
                    ApiError::InvalidParameter(format!("Unknown portfolio preset '{}'", name))
                })?
                .tickers(),
            (None, None) => PortfolioPreset::Tech.tickers(),
        };

        let weights = match &self.weights {
            None => None,
            Some(list) => Some(
                split_list(list)
                    .map(|w| {
                        w.parse::<f64>().map_err(|_| {
                            ApiError::InvalidParameter(format!("Invalid weight '{}'", w))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        Ok(Weights::from_parts(tickers, weights)?)
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// GET /portfolio - Weighted portfolio analysis
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PortfolioParams>,
) -> Result<Json<PortfolioAnalysis>, ApiError> {
    let weights = params.weights()?;
    let days = params.days.unwrap_or(state.config.risk.window);
    check_lookback(days)?;

    let provider = state.provider_for(params.seed);
    let analysis = PortfolioAnalysis::run(&*provider, &weights, days)?;

    Ok(Json(analysis))
}

// Risk

/// Query parameters for the risk endpoints
#[derive(Debug, Default, Deserialize)]
pub struct RiskQuery {
    pub confidence: Option<f64>,
    /// Business days of returns
    pub lookback: Option<usize>,
    /// Annual risk-free rate
    pub risk_free: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct MetricRow {
    pub metric: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct RiskResponse {
    pub ticker: Ticker,
    pub lookback: usize,
    pub metrics: RiskMetrics,
    pub rows: Vec<MetricRow>,
    pub returns: Vec<ReturnPoint>,
    pub histogram: Vec<HistogramBin>,
}

fn check_lookback(days: usize) -> Result<(), ApiError> {
    let (min, max) = LOOKBACK_RANGE;
    if (min..=max).contains(&days) {
        Ok(())
    } else {
        Err(ApiError::InvalidParameter(format!(
            "lookback must be between {} and {} days, got {}",
            min, max, days
        )))
    }
}

fn risk_params(state: &AppState, query: &RiskQuery) -> Result<(RiskParams, usize), ApiError> {
    let defaults = state.config.risk;
    let confidence = query.confidence.unwrap_or(defaults.confidence);
    let (low, high) = CONFIDENCE_RANGE;
    if !(low..=high).contains(&confidence) {
        return Err(ApiError::InvalidParameter(format!(
            "confidence must be between {} and {}, got {}",
            low, high, confidence
        )));
    }

    let risk_free_rate = query.risk_free.unwrap_or(defaults.risk_free_rate);
    let (min_rate, max_rate) = RISK_FREE_RANGE;
    if !(min_rate..=max_rate).contains(&risk_free_rate) {
        return Err(ApiError::InvalidParameter(format!(
            "risk_free must be between {} and {}, got {}",
            min_rate, max_rate, risk_free_rate
        )));
    }

    let lookback = query.lookback.unwrap_or(defaults.window);
    check_lookback(lookback)?;

    Ok((
        RiskParams {
            confidence,
            risk_free_rate,
        },
        lookback,
    ))
}

fn compute_risk(state: &AppState, symbol: &str, query: &RiskQuery) -> Result<RiskResponse, ApiError> {
    let ticker = Ticker::new(symbol)?;
    let (params, lookback) = risk_params(state, query)?;

    let series = state
        .provider_for(query.seed)
        .return_series(&ticker, lookback)?;
    if series.len() < MIN_OBSERVATIONS {
        return Err(ApiError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: series.len(),
        });
    }

    let values = series.values();
    let metrics = RiskMetrics::compute(&values, params)?;
    let rows = metrics
        .rows()
        .into_iter()
        .map(|(metric, value)| MetricRow { metric, value })
        .collect();

    info!(
        ticker = %ticker,
        lookback,
        confidence = params.confidence,
        var = metrics.var,
        "risk metrics computed"
    );

    Ok(RiskResponse {
        histogram: histogram(&values, HISTOGRAM_BINS),
        ticker,
        lookback,
        metrics,
        rows,
        returns: series.points,
    })
}

/// GET /risk/{ticker} - Risk metrics over the lookback window
pub async fn get_risk(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<RiskQuery>,
) -> Result<Json<RiskResponse>, ApiError> {
    Ok(Json(compute_risk(&state, &symbol, &query)?))
}

/// GET /risk/{ticker}/export.csv - Risk metric table as CSV
pub async fn export_risk_csv(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<RiskQuery>,
) -> Result<Response, ApiError> {
    let risk = compute_risk(&state, &symbol, &query)?;
    let rows: Vec<(String, String)> = risk
        .rows
        .into_iter()
        .map(|row| (row.metric, row.value))
        .collect();
    let bytes = metrics_csv(&rows)?;
    let file_name = format!(
        "{}_risk_metrics_{}.csv",
        risk.ticker,
        Utc::now().format("%Y%m%d")
    );
    Ok(attachment("text/csv; charset=utf-8", &file_name, bytes))
}

// Reports

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub report_types: Vec<ReportTypeInfo>,
    pub templates: &'static [ReportTemplate],
}

#[derive(Debug, Serialize)]
pub struct ReportTypeInfo {
    pub id: ReportType,
    pub title: &'static str,
}

/// GET /reports/templates - Report types and layout templates
pub async fn list_templates() -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        report_types: ReportType::ALL
            .iter()
            .map(|report_type| ReportTypeInfo {
                id: *report_type,
                title: report_type.title(),
            })
            .collect(),
        templates: &TEMPLATES,
    })
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub reports: Vec<ReportSummary>,
}

/// GET /reports - Report history, newest first
pub async fn list_reports(State(state): State<Arc<AppState>>) -> Json<ReportsResponse> {
    let reports = state.reports.read().await.list();
    Json(ReportsResponse { reports })
}

#[derive(Debug, Serialize)]
pub struct DownloadLink {
    pub format: ReportFormat,
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateReportResponse {
    pub id: Uuid,
    pub number: String,
    pub title: &'static str,
    pub downloads: Vec<DownloadLink>,
}

/// POST /reports - Generate a report and keep it in the history
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> Result<(StatusCode, Json<CreateReportResponse>), ApiError> {
    let provider = state.provider_for(request.seed);
    let report = Report::generate(&*provider, request, Utc::now())?;

    let downloads = report
        .request
        .formats
        .enabled()
        .into_iter()
        .map(|format| DownloadLink {
            format,
            file_name: report.file_name(format),
            url: format!("/reports/{}/download/{}", report.id, format.extension()),
        })
        .collect();
    let response = CreateReportResponse {
        id: report.id,
        number: report.number.clone(),
        title: report.title(),
        downloads,
    };

    if let Some(evicted) = state.reports.write().await.insert(report) {
        info!(id = %evicted.id, "evicted oldest report from history");
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /reports/{id} - Stored report with its data
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, ApiError> {
    let reports = state.reports.read().await;
    let report = reports.get(&id).ok_or(ApiError::ReportNotFound(id))?;
    Ok(Json(report.clone()))
}

/// GET /reports/{id}/download/{format} - Rendered report file
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path((id, format)): Path<(Uuid, String)>,
) -> Result<Response, ApiError> {
    let format = ReportFormat::parse(&format).ok_or_else(|| {
        ApiError::InvalidParameter(format!(
            "Unknown format '{}', expected html, xlsx or txt",
            format
        ))
    })?;

    let reports = state.reports.read().await;
    let report = reports.get(&id).ok_or(ApiError::ReportNotFound(id))?;
    let file = render_report(report, format)?;

    Ok(attachment(file.content_type, &file.file_name, file.bytes))
}

fn attachment(content_type: &str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}
