use crate::generator::GeneratorError;
use crate::ticker::Ticker;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Named analysis window offered by the stock page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
    ];

    /// Parses a period label such as `"6mo"` or `"1y"`.
    pub fn parse(label: &str) -> Option<Self> {
        Period::ALL
            .iter()
            .copied()
            .find(|period| period.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
        }
    }

    /// Number of days covered by the period.
    ///
    /// Years count 252 trading days; months count calendar-ish 30 days.
    pub fn days(&self) -> usize {
        match self {
            Period::OneMonth => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 252,
            Period::TwoYears => 504,
            Period::FiveYears => 1260,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::OneYear
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How far back a series reaches from its anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// Business days inside the last `period.days()` calendar days
    Period(Period),
    /// Exactly `n` business days ending at the anchor
    BusinessDays(usize),
}

/// Returns true for Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business dates covered by `lookback`, oldest first, ending at or before `end`.
pub fn business_days(lookback: Lookback, end: NaiveDate) -> Vec<NaiveDate> {
    match lookback {
        Lookback::Period(period) => {
            let days = period.days();
            let start = end - Duration::days(days as i64);
            start
                .iter_days()
                .take_while(|date| *date <= end)
                .filter(|date| is_business_day(*date))
                .take(days)
                .collect()
        }
        Lookback::BusinessDays(count) => {
            let mut dates = Vec::with_capacity(count);
            let mut cursor = end;
            while dates.len() < count {
                if is_business_day(cursor) {
                    dates.push(cursor);
                }
                match cursor.pred_opt() {
                    Some(previous) => cursor = previous,
                    None => break,
                }
            }
            dates.reverse();
            dates
        }
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily price history of one ticker, oldest bar first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub ticker: Ticker,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: Ticker, bars: Vec<PriceBar>) -> Self {
        PriceSeries { ticker, bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Daily simple returns of the close, dated by the later bar.
    pub fn returns(&self) -> ReturnSeries {
        let points = self
            .bars
            .windows(2)
            .map(|pair| ReturnPoint {
                date: pair[1].date,
                value: crate::analytics::simple_return(pair[0].close, pair[1].close),
            })
            .collect();

        ReturnSeries {
            ticker: self.ticker.clone(),
            points,
        }
    }
}

/// A dated daily return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Daily returns of one ticker, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub ticker: Ticker,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Source of price and return histories.
///
/// The dashboard only ever talks to this trait, so handlers and analytics do
/// not care whether the numbers come from the synthetic generator or from a
/// fixed fixture.
pub trait MarketDataProvider {
    /// Daily OHLCV bars for `ticker` over `lookback`.
    fn price_series(
        &self,
        ticker: &Ticker,
        lookback: Lookback,
    ) -> Result<PriceSeries, MarketDataError>;

    /// The last `days` daily returns for `ticker`.
    fn return_series(&self, ticker: &Ticker, days: usize) -> Result<ReturnSeries, MarketDataError>;

    /// Pinned anchor date, if windows do not end today.
    fn as_of(&self) -> Option<NaiveDate> {
        None
    }
}

/// Errors that can occur when querying a market data provider.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Ticker not known to the provider
    UnknownTicker(String),
    /// The requested window is empty or out of range
    InvalidLookback(String),
    /// The synthetic generator rejected its parameters
    Generator(GeneratorError),
}

impl fmt::Display for MarketDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketDataError::UnknownTicker(ticker) => write!(f, "Unknown ticker: {}", ticker),
            MarketDataError::InvalidLookback(msg) => write!(f, "Invalid lookback: {}", msg),
            MarketDataError::Generator(err) => write!(f, "Data generation failed: {}", err),
        }
    }
}

impl std::error::Error for MarketDataError {}

impl From<GeneratorError> for MarketDataError {
    fn from(err: GeneratorError) -> Self {
        MarketDataError::Generator(err)
    }
}

/// Fixed in-memory data, mainly for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    prices: HashMap<Ticker, PriceSeries>,
    returns: HashMap<Ticker, ReturnSeries>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a price history. Bars should be sorted by date.
    pub fn add_prices(&mut self, series: PriceSeries) {
        self.prices.insert(series.ticker.clone(), series);
    }

    /// Adds an explicit return history, overriding returns derived from prices.
    pub fn add_returns(&mut self, series: ReturnSeries) {
        self.returns.insert(series.ticker.clone(), series);
    }

    pub fn clear(&mut self) {
        self.prices.clear();
        self.returns.clear();
    }
}

impl MarketDataProvider for InMemoryMarketData {
    fn price_series(
        &self,
        ticker: &Ticker,
        lookback: Lookback,
    ) -> Result<PriceSeries, MarketDataError> {
        let series = self
            .prices
            .get(ticker)
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_string()))?;

        let last_date = match series.last() {
            Some(bar) => bar.date,
            None => return Ok(series.clone()),
        };

        let wanted = business_days(lookback, last_date);
        let bars = match wanted.first() {
            Some(first) => series
                .bars
                .iter()
                .filter(|bar| bar.date >= *first)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        Ok(PriceSeries::new(ticker.clone(), bars))
    }

    fn return_series(&self, ticker: &Ticker, days: usize) -> Result<ReturnSeries, MarketDataError> {
        let full = match self.returns.get(ticker) {
            Some(series) => series.clone(),
            None => self
                .prices
                .get(ticker)
                .map(PriceSeries::returns)
                .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_string()))?,
        };

        let skip = full.points.len().saturating_sub(days);
        Ok(ReturnSeries {
            ticker: full.ticker,
            points: full.points.into_iter().skip(skip).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(day: NaiveDate, close: f64) -> PriceBar {
        PriceBar {
            date: day,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000_000,
        }
    }

    #[test]
    fn test_period_parse_and_days() {
        assert_eq!(Period::parse("6mo"), Some(Period::SixMonths));
        assert_eq!(Period::parse("5Y"), Some(Period::FiveYears));
        assert_eq!(Period::parse("10y"), None);
        assert_eq!(Period::default().days(), 252);
        assert_eq!(Period::TwoYears.days(), 504);
    }

    #[test]
    fn test_business_days_exact_count_skips_weekends() {
        // 2024-01-15 is a Monday
        let dates = business_days(Lookback::BusinessDays(6), date(2024, 1, 15));
        assert_eq!(dates.len(), 6);
        assert_eq!(dates.first(), Some(&date(2024, 1, 8)));
        assert_eq!(dates.last(), Some(&date(2024, 1, 15)));
        assert!(dates.iter().all(|d| is_business_day(*d)));
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_business_days_for_period_stays_inside_window() {
        let end = date(2024, 6, 28);
        let dates = business_days(Lookback::Period(Period::OneMonth), end);
        // 2024-05-29 ..= 2024-06-28 holds 23 weekdays
        assert_eq!(dates.len(), 23);
        assert!(*dates.first().unwrap() >= end - Duration::days(30));
        assert!(*dates.last().unwrap() <= end);
    }

    #[test]
    fn test_price_series_returns() {
        let ticker = Ticker::new("AAPL").unwrap();
        let series = PriceSeries::new(
            ticker,
            vec![
                bar(date(2024, 1, 15), 100.0),
                bar(date(2024, 1, 16), 110.0),
                bar(date(2024, 1, 17), 99.0),
            ],
        );

        let returns = series.returns();
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.points[0].date, date(2024, 1, 16));
        assert!((returns.points[0].value - 0.10).abs() < 1e-12);
        assert!((returns.points[1].value + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_in_memory_provider_unknown_ticker() {
        let provider = InMemoryMarketData::new();
        let ticker = Ticker::new("AAPL").unwrap();
        let result = provider.price_series(&ticker, Lookback::BusinessDays(5));
        assert_eq!(
            result.unwrap_err(),
            MarketDataError::UnknownTicker("AAPL".to_string())
        );
    }

    #[test]
    fn test_in_memory_provider_trims_to_lookback() {
        let ticker = Ticker::new("MSFT").unwrap();
        let bars = business_days(Lookback::BusinessDays(10), date(2024, 1, 19))
            .into_iter()
            .enumerate()
            .map(|(i, d)| bar(d, 100.0 + i as f64))
            .collect();

        let mut provider = InMemoryMarketData::new();
        provider.add_prices(PriceSeries::new(ticker.clone(), bars));

        let series = provider
            .price_series(&ticker, Lookback::BusinessDays(3))
            .unwrap();
        assert_eq!(series.closes(), vec![107.0, 108.0, 109.0]);

        let returns = provider.return_series(&ticker, 4).unwrap();
        assert_eq!(returns.len(), 4);
        assert_eq!(returns.points.last().unwrap().date, date(2024, 1, 19));
    }

    #[test]
    fn test_in_memory_provider_prefers_explicit_returns() {
        let ticker = Ticker::new("SPY").unwrap();
        let mut provider = InMemoryMarketData::new();
        provider.add_returns(ReturnSeries {
            ticker: ticker.clone(),
            points: vec![
                ReturnPoint { date: date(2024, 1, 15), value: 0.01 },
                ReturnPoint { date: date(2024, 1, 16), value: -0.02 },
            ],
        });

        let returns = provider.return_series(&ticker, 10).unwrap();
        assert_eq!(returns.values(), vec![0.01, -0.02]);
    }
}
