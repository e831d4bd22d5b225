//! Analytics Functions
//!
//! Return and risk statistics over daily return series. The primitives work on
//! plain `f64` slices; [`risk`] and [`performance`] assemble them into the
//! records shown on the dashboard.

mod primitives;
pub mod performance;
pub mod risk;

pub use performance::{PerformanceSummary, PriceStats};
pub use primitives::{
    annualize_return, annualize_volatility, correlation, cumulative_returns, excess_kurtosis,
    histogram, max_drawdown, mean, pct_change, percentile, sharpe_ratio, simple_return,
    skewness, std_dev, HistogramBin, TRADING_DAYS,
};
pub use risk::{RiskMetrics, RiskParams, MIN_OBSERVATIONS};

use std::fmt;

/// Errors raised by the statistics routines.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The input series has no observations
    EmptySeries,
    /// Not enough observations for a meaningful estimate
    InsufficientData { required: usize, actual: usize },
    /// Confidence level outside the open interval (0, 1)
    InvalidConfidence(f64),
    /// Risk-free rate is not a finite number
    InvalidRiskFreeRate(f64),
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsError::EmptySeries => write!(f, "Return series is empty"),
            AnalyticsError::InsufficientData { required, actual } => write!(
                f,
                "Insufficient data: {} observations required, {} available",
                required, actual
            ),
            AnalyticsError::InvalidConfidence(c) => {
                write!(f, "Confidence level must be in (0, 1), got {}", c)
            }
            AnalyticsError::InvalidRiskFreeRate(r) => {
                write!(f, "Risk-free rate must be finite, got {}", r)
            }
        }
    }
}

impl std::error::Error for AnalyticsError {}
