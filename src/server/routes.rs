//! Route definitions for the API server

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Creates the main application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // Dashboard front ends may be served from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/tickers", get(handlers::list_tickers))
        // Single stock analysis
        .route("/stocks/:ticker", get(handlers::get_stock))
        .route("/stocks/:ticker/export.csv", get(handlers::export_stock_csv))
        // Portfolio analysis
        .route("/portfolio", get(handlers::get_portfolio))
        // Risk metrics
        .route("/risk/:ticker", get(handlers::get_risk))
        .route("/risk/:ticker/export.csv", get(handlers::export_risk_csv))
        // Reports
        .route("/reports/templates", get(handlers::list_templates))
        .route(
            "/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route("/reports/:id", get(handlers::get_report))
        .route("/reports/:id/download/:format", get(handlers::download_report))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
