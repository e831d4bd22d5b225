//! Error types for the REST API server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::analytics::AnalyticsError;
use crate::export::ExportError;
use crate::portfolio::PortfolioError;
use crate::report::ReportError;
use crate::ticker::TickerError;
use crate::time_series::MarketDataError;

/// API error types
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Ticker unknown to the market data provider
    TickerNotFound(String),
    /// Invalid parameter in request
    InvalidParameter(String),
    /// Too few observations for the requested statistic
    InsufficientData { required: usize, actual: usize },
    /// Report id not in the history
    ReportNotFound(Uuid),
    /// Analytics computation failed
    ComputationFailed(String),
    /// Internal server error
    InternalError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::TickerNotFound(ticker) => write!(f, "Ticker not found: {}", ticker),
            ApiError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ApiError::InsufficientData { required, actual } => write!(
                f,
                "Insufficient data: {} observations required, {} available",
                required, actual
            ),
            ApiError::ReportNotFound(id) => write!(f, "Report not found: {}", id),
            ApiError::ComputationFailed(msg) => write!(f, "Computation failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::TickerNotFound(ticker) => (
                StatusCode::NOT_FOUND,
                "TickerNotFound",
                format!("No market data for ticker '{}'", ticker),
            ),
            ApiError::InvalidParameter(msg) => {
                (StatusCode::BAD_REQUEST, "InvalidParameter", msg.clone())
            }
            ApiError::InsufficientData { required, actual } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "InsufficientData",
                format!(
                    "At least {} observations are required, {} available",
                    required, actual
                ),
            ),
            ApiError::ReportNotFound(id) => (
                StatusCode::NOT_FOUND,
                "ReportNotFound",
                format!("Report '{}' not found", id),
            ),
            ApiError::ComputationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ComputationFailed",
                msg.clone(),
            ),
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                msg.clone(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = error_type, "{}", message);
        }

        let body = Json(json!({
            "error": error_type,
            "message": message,
        }));

        (status, body).into_response()
    }
}

// Conversions from library error types

impl From<TickerError> for ApiError {
    fn from(err: TickerError) -> Self {
        ApiError::InvalidParameter(err.to_string())
    }
}

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::UnknownTicker(ticker) => ApiError::TickerNotFound(ticker),
            MarketDataError::InvalidLookback(msg) => ApiError::InvalidParameter(msg),
            MarketDataError::Generator(e) => ApiError::ComputationFailed(e.to_string()),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::EmptySeries => ApiError::InsufficientData {
                required: 1,
                actual: 0,
            },
            AnalyticsError::InsufficientData { required, actual } => {
                ApiError::InsufficientData { required, actual }
            }
            AnalyticsError::InvalidConfidence(_) | AnalyticsError::InvalidRiskFreeRate(_) => {
                ApiError::InvalidParameter(err.to_string())
            }
        }
    }
}

impl From<PortfolioError> for ApiError {
    fn from(err: PortfolioError) -> Self {
        match err {
            PortfolioError::MarketData(e) => e.into(),
            PortfolioError::Analytics(e) => e.into(),
            PortfolioError::MisalignedSeries(msg) => ApiError::ComputationFailed(msg),
            other => ApiError::InvalidParameter(other.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidRequest(msg) => ApiError::InvalidParameter(msg),
            ReportError::Portfolio(e) => e.into(),
            ReportError::Ticker(e) => ApiError::ComputationFailed(e.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::FormatDisabled(_) => ApiError::InvalidParameter(err.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorError;

    #[test]
    fn library_errors_map_to_api_kinds() {
        assert_eq!(
            ApiError::from(MarketDataError::UnknownTicker("ZZZ".to_string())),
            ApiError::TickerNotFound("ZZZ".to_string())
        );
        assert_eq!(
            ApiError::from(PortfolioError::Analytics(AnalyticsError::InsufficientData {
                required: 30,
                actual: 12
            })),
            ApiError::InsufficientData {
                required: 30,
                actual: 12
            }
        );
        assert!(matches!(
            ApiError::from(PortfolioError::ZeroTotalWeight),
            ApiError::InvalidParameter(_)
        ));
        assert!(matches!(
            ApiError::from(MarketDataError::Generator(GeneratorError::EmptyWindow)),
            ApiError::ComputationFailed(_)
        ));
    }

    #[test]
    fn status_codes() {
        let cases = [
            (ApiError::TickerNotFound("X".into()), StatusCode::NOT_FOUND),
            (ApiError::InvalidParameter("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::InsufficientData {
                    required: 30,
                    actual: 3,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ApiError::ReportNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (
                ApiError::InternalError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
