//! Summary statistics for the single-stock page.

use super::primitives::{annualize_return, annualize_volatility, mean, sharpe_ratio, std_dev};
use super::AnalyticsError;
use crate::time_series::PriceSeries;
use serde::Serialize;

/// Headline price figures for a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub current_price: f64,
    /// Change from the first to the last close, in percent
    pub period_change_pct: f64,
    pub highest_price: f64,
    pub lowest_price: f64,
}

impl PriceStats {
    pub fn from_series(series: &PriceSeries) -> Result<Self, AnalyticsError> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AnalyticsError::EmptySeries),
        };

        let period_change_pct = if first.close != 0.0 {
            (last.close - first.close) / first.close * 100.0
        } else {
            0.0
        };

        let highest_price = series
            .bars
            .iter()
            .map(|bar| bar.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest_price = series
            .bars
            .iter()
            .map(|bar| bar.low)
            .fold(f64::INFINITY, f64::min);

        Ok(PriceStats {
            current_price: last.close,
            period_change_pct,
            highest_price,
            lowest_price,
        })
    }
}

/// Return statistics shown next to the price chart.
///
/// Unlike [`super::RiskMetrics`] the Sharpe ratio here assumes a zero
/// risk-free rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub mean_daily_return: f64,
    pub daily_std: f64,
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    pub best_day: f64,
    pub worst_day: f64,
}

impl PerformanceSummary {
    pub fn from_returns(returns: &[f64]) -> Result<Self, AnalyticsError> {
        if returns.is_empty() {
            return Err(AnalyticsError::EmptySeries);
        }

        let mean_daily_return = mean(returns);
        // A single observation has no spread; report it as flat rather than NaN.
        let daily_std = if returns.len() > 1 { std_dev(returns) } else { 0.0 };
        let annual_return = annualize_return(mean_daily_return);
        let annual_volatility = annualize_volatility(daily_std);

        Ok(PerformanceSummary {
            mean_daily_return,
            daily_std,
            annual_return,
            annual_volatility,
            sharpe_ratio: sharpe_ratio(annual_return, annual_volatility, 0.0),
            best_day: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_day: returns.iter().copied().fold(f64::INFINITY, f64::min),
        })
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Mean Daily Return", format!("{:.4}%", self.mean_daily_return * 100.0)),
            ("Daily Return Std Dev", format!("{:.4}%", self.daily_std * 100.0)),
            ("Annual Return", format!("{:.2}%", self.annual_return * 100.0)),
            ("Annual Volatility", format!("{:.2}%", self.annual_volatility * 100.0)),
            ("Sharpe Ratio", format!("{:.2}", self.sharpe_ratio)),
            ("Best Day", format!("{:.2}%", self.best_day * 100.0)),
            ("Worst Day", format!("{:.2}%", self.worst_day * 100.0)),
        ]
    }
}
