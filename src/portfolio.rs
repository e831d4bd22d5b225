//! Multi-asset portfolio analysis.
//!
//! A portfolio is a set of tickers with weights summing to one. Each asset's
//! path is generated over the same business-day window, daily portfolio
//! returns are the weighted sum of asset returns (daily rebalancing), and the
//! dashboard metrics are derived from that single series.

use crate::analytics::{
    annualize_return, annualize_volatility, correlation, cumulative_returns, max_drawdown, mean,
    pct_change, sharpe_ratio, simple_return, std_dev, AnalyticsError,
};
use crate::ticker::Ticker;
use crate::time_series::{Lookback, MarketDataError, MarketDataProvider, PriceSeries};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::info;

/// Upper bound on the number of assets in one request.
pub const MAX_ASSETS: usize = 25;

/// Errors raised while building or analysing a portfolio.
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioError {
    /// No tickers were supplied
    Empty,
    /// More tickers than [`MAX_ASSETS`]
    TooManyAssets(usize),
    /// The same ticker appears twice
    DuplicateTicker(String),
    /// A weight is negative or not finite
    InvalidWeight { ticker: String, weight: f64 },
    /// Weights sum to zero
    ZeroTotalWeight,
    /// Weight list and ticker list differ in length
    WeightCountMismatch { tickers: usize, weights: usize },
    /// An asset history is missing, out of order or off the shared dates
    MisalignedSeries(String),
    MarketData(MarketDataError),
    Analytics(AnalyticsError),
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioError::Empty => write!(f, "Portfolio needs at least one ticker"),
            PortfolioError::TooManyAssets(n) => {
                write!(f, "Portfolio has {} assets, maximum is {}", n, MAX_ASSETS)
            }
            PortfolioError::DuplicateTicker(t) => write!(f, "Duplicate ticker: {}", t),
            PortfolioError::InvalidWeight { ticker, weight } => {
                write!(f, "Invalid weight {} for {}", weight, ticker)
            }
            PortfolioError::ZeroTotalWeight => write!(f, "Weights sum to zero"),
            PortfolioError::WeightCountMismatch { tickers, weights } => write!(
                f,
                "{} weights supplied for {} tickers",
                weights, tickers
            ),
            PortfolioError::MisalignedSeries(t) => {
                write!(f, "Price history of {} does not line up with the portfolio", t)
            }
            PortfolioError::MarketData(err) => write!(f, "{}", err),
            PortfolioError::Analytics(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PortfolioError {}

impl From<MarketDataError> for PortfolioError {
    fn from(err: MarketDataError) -> Self {
        PortfolioError::MarketData(err)
    }
}

impl From<AnalyticsError> for PortfolioError {
    fn from(err: AnalyticsError) -> Self {
        PortfolioError::Analytics(err)
    }
}

/// Normalized portfolio weights in ticker order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weights {
    entries: Vec<(Ticker, f64)>,
}

impl Weights {
    /// `1 / n` for each ticker.
    pub fn equal(tickers: Vec<Ticker>) -> Result<Self, PortfolioError> {
        check_tickers(&tickers)?;
        let weight = 1.0 / tickers.len() as f64;
        Ok(Weights {
            entries: tickers.into_iter().map(|t| (t, weight)).collect(),
        })
    }

    /// Custom weights, rescaled to sum to one.
    pub fn custom(pairs: Vec<(Ticker, f64)>) -> Result<Self, PortfolioError> {
        let tickers: Vec<Ticker> = pairs.iter().map(|(t, _)| t.clone()).collect();
        check_tickers(&tickers)?;

        for (ticker, weight) in &pairs {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(PortfolioError::InvalidWeight {
                    ticker: ticker.to_string(),
                    weight: *weight,
                });
            }
        }

        let total: f64 = pairs.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(PortfolioError::ZeroTotalWeight);
        }

        Ok(Weights {
            entries: pairs.into_iter().map(|(t, w)| (t, w / total)).collect(),
        })
    }

    /// Pairs `weights` with `tickers` positionally, or falls back to equal
    /// weights when no list is given.
    pub fn from_parts(tickers: Vec<Ticker>, weights: Option<Vec<f64>>) -> Result<Self, PortfolioError> {
        match weights {
            None => Weights::equal(tickers),
            Some(weights) if weights.len() != tickers.len() => {
                Err(PortfolioError::WeightCountMismatch {
                    tickers: tickers.len(),
                    weights: weights.len(),
                })
            }
            Some(weights) => Weights::custom(tickers.into_iter().zip(weights).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        self.entries.iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, w)| *w).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, f64)> {
        self.entries.iter().map(|(t, w)| (t, *w))
    }
}

fn check_tickers(tickers: &[Ticker]) -> Result<(), PortfolioError> {
    if tickers.is_empty() {
        return Err(PortfolioError::Empty);
    }
    if tickers.len() > MAX_ASSETS {
        return Err(PortfolioError::TooManyAssets(tickers.len()));
    }
    let mut seen = HashSet::new();
    for ticker in tickers {
        if !seen.insert(ticker) {
            return Err(PortfolioError::DuplicateTicker(ticker.to_string()));
        }
    }
    Ok(())
}

/// One point of the cumulative return curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Headline portfolio statistics (zero risk-free rate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub total_return: f64,
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    /// Non-positive fraction, e.g. -0.12
    pub max_drawdown: f64,
}

/// One row of the allocation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    pub ticker: Ticker,
    pub weight: f64,
    pub current_price: f64,
    /// Close-to-close return over the whole window
    pub period_return: f64,
}

/// Pairwise return correlations in ticker order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<Ticker>,
    pub values: Vec<Vec<f64>>,
}

/// Result of analysing a weighted portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAnalysis {
    pub weights: Weights,
    pub days: usize,
    pub daily_returns: Vec<CurvePoint>,
    pub cumulative_returns: Vec<CurvePoint>,
    pub metrics: PortfolioMetrics,
    pub allocation: Vec<AllocationRow>,
    pub correlation: CorrelationMatrix,
}

impl PortfolioAnalysis {
    /// Generates every asset over `days` business days and analyses the
    /// weighted portfolio.
    pub fn run<P>(provider: &P, weights: &Weights, days: usize) -> Result<Self, PortfolioError>
    where
        P: MarketDataProvider + Sync + ?Sized,
    {
        if days < 2 {
            return Err(AnalyticsError::InsufficientData {
                required: 2,
                actual: days,
            }
            .into());
        }

        let tickers = weights.tickers();
        let histories: Vec<PriceSeries> = tickers
            .par_iter()
            .map(|ticker| provider.price_series(ticker, Lookback::BusinessDays(days)))
            .collect::<Result<_, _>>()?;

        let analysis = Self::from_histories(weights, &histories)?;

        info!(
            assets = weights.len(),
            days,
            annual_return = analysis.metrics.annual_return,
            "portfolio analysed"
        );

        Ok(analysis)
    }

    /// Analyses already loaded histories, given in the same order as `weights`.
    pub fn from_histories(weights: &Weights, histories: &[PriceSeries]) -> Result<Self, PortfolioError> {
        let tickers = weights.tickers();
        for i in 0..tickers.len().max(histories.len()) {
            match (tickers.get(i), histories.get(i)) {
                (Some(ticker), Some(series)) if series.ticker == *ticker => {}
                (Some(ticker), _) => {
                    return Err(PortfolioError::MisalignedSeries(ticker.to_string()))
                }
                (None, Some(series)) => {
                    return Err(PortfolioError::MisalignedSeries(series.ticker.to_string()))
                }
                (None, None) => {}
            }
        }

        let reference = histories.first().ok_or(PortfolioError::Empty)?;
        let dates = reference.dates();
        for series in histories {
            if series.dates() != dates {
                return Err(PortfolioError::MisalignedSeries(series.ticker.to_string()));
            }
        }
        if dates.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                required: 2,
                actual: dates.len(),
            }
            .into());
        }

        let asset_returns: Vec<Vec<f64>> = histories
            .iter()
            .map(|series| pct_change(&series.closes()))
            .collect();

        let weight_values = weights.values();
        let portfolio_returns: Vec<f64> = (0..dates.len() - 1)
            .map(|t| {
                asset_returns
                    .iter()
                    .zip(&weight_values)
                    .map(|(returns, w)| returns[t] * w)
                    .sum()
            })
            .collect();

        let return_dates = &dates[1..];
        let daily_returns = return_dates
            .iter()
            .zip(&portfolio_returns)
            .map(|(&date, &value)| CurvePoint { date, value })
            .collect();
        let cumulative: Vec<CurvePoint> = return_dates
            .iter()
            .zip(cumulative_returns(&portfolio_returns))
            .map(|(&date, value)| CurvePoint { date, value })
            .collect();

        let daily_std = if portfolio_returns.len() > 1 {
            std_dev(&portfolio_returns)
        } else {
            0.0
        };
        let annual_return = annualize_return(mean(&portfolio_returns));
        let annual_volatility = annualize_volatility(daily_std);
        let metrics = PortfolioMetrics {
            total_return: cumulative.last().map(|p| p.value).unwrap_or(0.0),
            annual_return,
            annual_volatility,
            sharpe_ratio: sharpe_ratio(annual_return, annual_volatility, 0.0),
            max_drawdown: max_drawdown(&portfolio_returns),
        };

        let allocation = weights
            .iter()
            .zip(histories)
            .map(|((ticker, weight), series)| {
                let first = series.first().map(|bar| bar.close).unwrap_or(0.0);
                let last = series.last().map(|bar| bar.close).unwrap_or(0.0);
                AllocationRow {
                    ticker: ticker.clone(),
                    weight,
                    current_price: last,
                    period_return: simple_return(first, last),
                }
            })
            .collect();

        let values = asset_returns
            .iter()
            .map(|a| asset_returns.iter().map(|b| correlation(a, b)).collect())
            .collect();

        Ok(PortfolioAnalysis {
            weights: weights.clone(),
            days: dates.len(),
            daily_returns,
            cumulative_returns: cumulative,
            metrics,
            allocation,
            correlation: CorrelationMatrix {
                tickers: weights.tickers(),
                values,
            },
        })
    }
}
