//! Stateless statistics primitives.
//!
//! Pure functions over slices of daily returns or prices. Sample moments go
//! through `statrs`; order statistics and the higher moments are computed
//! here so their exact definitions stay visible.

use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Simple return between two prices.
///
/// Returns `0.0` when the earlier price is zero or either price is NaN.
pub fn simple_return(previous: f64, current: f64) -> f64 {
    if previous == 0.0 || previous.is_nan() || current.is_nan() {
        return 0.0;
    }
    current / previous - 1.0
}

/// Calculates percentage changes from a price series.
///
/// # Arguments
/// * `prices` - Slice of prices, oldest first
///
/// # Returns
/// Vector of `prices.len() - 1` simple returns (the undefined first change is
/// dropped rather than reported as NaN)
///
/// # Examples
/// ```
/// use finrisk::analytics::pct_change;
///
/// let returns = pct_change(&[100.0, 110.0, 99.0]);
/// assert_eq!(returns.len(), 2);
/// assert!((returns[0] - 0.10).abs() < 1e-12);
/// ```
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| simple_return(pair[0], pair[1]))
        .collect()
}

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Sample standard deviation (n - 1 denominator), NaN below two values.
///
/// Deviations are taken around the mean in a second pass, so a constant
/// series gives exactly `0.0`.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mu = mean(values);
    let squares: f64 = values.iter().map(|v| (v - mu) * (v - mu)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}

/// `mean * 252`
pub fn annualize_return(mean_daily: f64) -> f64 {
    mean_daily * TRADING_DAYS
}

/// `std * sqrt(252)`
pub fn annualize_volatility(std_daily: f64) -> f64 {
    std_daily * TRADING_DAYS.sqrt()
}

/// Excess annual return per unit of annual volatility.
///
/// Zero (or non-finite) volatility yields a Sharpe ratio of `0.0`.
pub fn sharpe_ratio(annual_return: f64, annual_volatility: f64, risk_free_rate: f64) -> f64 {
    if annual_volatility > 0.0 && annual_volatility.is_finite() {
        (annual_return - risk_free_rate) / annual_volatility
    } else {
        0.0
    }
}

/// Empirical percentile with linear interpolation between order statistics.
///
/// `q` is in percent (`5.0` is the 5th percentile). The rank of the result is
/// `q / 100 * (n - 1)`; fractional ranks interpolate between neighbours.
/// Returns NaN for an empty slice.
///
/// # Examples
/// ```
/// use finrisk::analytics::percentile;
///
/// let values = [4.0, 1.0, 3.0, 2.0];
/// assert_eq!(percentile(&values, 0.0), 1.0);
/// assert_eq!(percentile(&values, 50.0), 2.5);
/// assert_eq!(percentile(&values, 100.0), 4.0);
/// ```
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by_key(|value| OrderedFloat(*value));

    let q = q.clamp(0.0, 100.0);
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Central moments m2, m3, m4 with a 1/n denominator.
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mu = mean(values);
    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &v| {
        let d = v - mu;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });

    Some((m2 / n, m3 / n, m4 / n))
}

/// Biased sample skewness `m3 / m2^1.5`; `0.0` for constant or empty input.
pub fn skewness(values: &[f64]) -> f64 {
    match central_moments(values) {
        Some((m2, m3, _)) if m2 > 0.0 => m3 / m2.powf(1.5),
        _ => 0.0,
    }
}

/// Biased excess kurtosis `m4 / m2^2 - 3` (normal distribution = 0);
/// `0.0` for constant or empty input.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    match central_moments(values) {
        Some((m2, _, m4)) if m2 > 0.0 => m4 / (m2 * m2) - 3.0,
        _ => 0.0,
    }
}

/// Compounded return path: `prod(1 + r) - 1` at each step.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    let mut wealth = 1.0;
    returns
        .iter()
        .map(|r| {
            wealth *= 1.0 + r;
            wealth - 1.0
        })
        .collect()
}

/// Deepest peak-to-trough decline of the compounded path, as a non-positive
/// fraction (`-0.25` is a 25% drawdown). `0.0` for an empty series.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut wealth = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;

    for r in returns {
        wealth *= 1.0 + r;
        peak = peak.max(wealth);
        if peak > 0.0 {
            worst = worst.min(wealth / peak - 1.0);
        }
    }

    worst
}

/// Pearson correlation of two equally long series.
///
/// Returns `0.0` when either series has zero variance or the lengths differ.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let sx = std_dev(x);
    let sy = std_dev(y);
    if !(sx > 0.0 && sy > 0.0) {
        return 0.0;
    }

    x.iter().covariance(y.iter()) / (sx * sy)
}

/// One histogram bucket. The last bucket is closed on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Buckets `values` into `bins` equal-width bins spanning their range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (min, max) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}
