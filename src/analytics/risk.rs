//! Historical risk metrics for a daily return series.

use super::primitives::{
    annualize_return, annualize_volatility, excess_kurtosis, mean, percentile, sharpe_ratio,
    skewness, std_dev,
};
use super::AnalyticsError;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Fewest daily returns the dashboard accepts for a risk report.
pub const MIN_OBSERVATIONS: usize = 30;

/// Inputs of a risk calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskParams {
    /// VaR confidence level, e.g. 0.95
    pub confidence: f64,
    /// Annual risk-free rate used by the Sharpe ratio
    pub risk_free_rate: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            confidence: 0.95,
            risk_free_rate: 0.02,
        }
    }
}

impl RiskParams {
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(AnalyticsError::InvalidConfidence(self.confidence));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(AnalyticsError::InvalidRiskFreeRate(self.risk_free_rate));
        }
        Ok(())
    }
}

/// Risk-metric record derived in one pass from a return series.
///
/// VaR and CVaR keep the sign of the returns: a 95% VaR of `-0.021` means a
/// 2.1% daily loss is exceeded on one day in twenty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub observations: usize,
    pub confidence: f64,
    pub risk_free_rate: f64,
    pub mean_return: f64,
    pub std_return: f64,
    pub annual_return: f64,
    pub annual_volatility: f64,
    /// Historical VaR, the `(1 - confidence)` percentile of returns
    pub var: f64,
    /// Mean of the returns at or below `var`
    pub cvar: f64,
    /// Gaussian VaR from the sample mean and standard deviation
    pub parametric_var: f64,
    pub sharpe_ratio: f64,
    pub skewness: f64,
    /// Excess kurtosis (0 for a normal distribution)
    pub kurtosis: f64,
    /// Worst single-day return
    pub max_loss: f64,
}

impl RiskMetrics {
    /// Computes every metric for `returns`.
    ///
    /// # Errors
    /// - `EmptySeries` for an empty slice
    /// - `InsufficientData` below two observations (no sample deviation)
    /// - `InvalidConfidence` / `InvalidRiskFreeRate` for bad parameters
    pub fn compute(returns: &[f64], params: RiskParams) -> Result<Self, AnalyticsError> {
        params.validate()?;
        if returns.is_empty() {
            return Err(AnalyticsError::EmptySeries);
        }
        if returns.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                required: 2,
                actual: returns.len(),
            });
        }

        let mean_return = mean(returns);
        let std_return = std_dev(returns);
        let annual_return = annualize_return(mean_return);
        let annual_volatility = annualize_volatility(std_return);

        let var = percentile(returns, (1.0 - params.confidence) * 100.0);
        let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
        let cvar = if tail.is_empty() { var } else { mean(&tail) };

        let parametric_var = gaussian_var(mean_return, std_return, params.confidence)?;
        let max_loss = returns.iter().copied().fold(f64::INFINITY, f64::min);

        let metrics = RiskMetrics {
            observations: returns.len(),
            confidence: params.confidence,
            risk_free_rate: params.risk_free_rate,
            mean_return,
            std_return,
            annual_return,
            annual_volatility,
            var,
            cvar,
            parametric_var,
            sharpe_ratio: sharpe_ratio(annual_return, annual_volatility, params.risk_free_rate),
            skewness: skewness(returns),
            kurtosis: excess_kurtosis(returns),
            max_loss,
        };

        debug!(
            observations = metrics.observations,
            var = metrics.var,
            cvar = metrics.cvar,
            sharpe = metrics.sharpe_ratio,
            "computed risk metrics"
        );

        Ok(metrics)
    }

    /// Display rows in dashboard order: label and formatted value.
    pub fn rows(&self) -> Vec<(String, String)> {
        let level = format!("{:.0}%", self.confidence * 100.0);
        vec![
            ("Annual Volatility".to_string(), pct(self.annual_volatility, 2)),
            (format!("VaR ({})", level), pct(self.var, 2)),
            (format!("CVaR ({})", level), pct(self.cvar, 2)),
            (format!("Parametric VaR ({})", level), pct(self.parametric_var, 2)),
            ("Sharpe Ratio".to_string(), format!("{:.2}", self.sharpe_ratio)),
            ("Max Daily Loss".to_string(), pct(self.max_loss, 2)),
            ("Annual Return".to_string(), pct(self.annual_return, 2)),
            ("Skewness".to_string(), format!("{:.3}", self.skewness)),
            ("Kurtosis".to_string(), format!("{:.3}", self.kurtosis)),
            ("Mean Daily Return".to_string(), pct(self.mean_return, 4)),
            ("Daily Return Std Dev".to_string(), pct(self.std_return, 4)),
        ]
    }
}

fn pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// `mean + std * z(1 - confidence)`; a degenerate deviation collapses to the mean.
fn gaussian_var(mean: f64, std: f64, confidence: f64) -> Result<f64, AnalyticsError> {
    if !(std > 0.0) {
        return Ok(mean);
    }
    let standard =
        Normal::new(0.0, 1.0).map_err(|_| AnalyticsError::InvalidConfidence(confidence))?;
    Ok(mean + std * standard.inverse_cdf(1.0 - confidence))
}
