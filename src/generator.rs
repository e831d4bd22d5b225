//! Synthetic market data.
//!
//! Two generators live here:
//! - a geometric random walk with OHLCV bands, used for price charts and
//!   portfolio analysis
//! - a fat-tailed return process with volatility clustering and a handful of
//!   shock days, used by the risk page
//!
//! Both pick their drift/volatility pair from the ticker's [`SymbolClass`].

use crate::ticker::{ClassParams, SymbolClass, Ticker};
use crate::time_series::{
    business_days, Lookback, MarketDataError, MarketDataProvider, PriceBar, PriceSeries,
    ReturnPoint, ReturnSeries,
};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::fmt;

/// Standard deviation of the open-vs-previous-close gap.
const OPEN_GAP_STD: f64 = 0.001;
/// Maximum relative distance of the high/low from the open/close envelope.
const BAND_WIDTH: f64 = 0.02;
const MIN_VOLUME: u64 = 1_000_000;
const MAX_VOLUME: u64 = 10_000_000;

/// Weight of yesterday's return in today's return (stress process).
const AUTOCORRELATION: f64 = 0.1;
/// Volatility scaling by yesterday's absolute return (stress process).
const CLUSTERING: f64 = 0.5;
/// One shock day per this many observations.
const SHOCK_SPACING: usize = 50;
const SHOCK_MULTIPLIER: f64 = 2.0;

/// Errors raised for unusable generator inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// Volatility is negative or not finite
    InvalidVolatility(f64),
    /// Drift is not finite
    InvalidDrift(f64),
    /// Base price range is empty or non-positive
    InvalidPriceRange { min: f64, max: f64 },
    /// Nothing to generate
    EmptyWindow,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::InvalidVolatility(v) => write!(f, "Invalid volatility: {}", v),
            GeneratorError::InvalidDrift(d) => write!(f, "Invalid drift: {}", d),
            GeneratorError::InvalidPriceRange { min, max } => {
                write!(f, "Invalid base price range: [{}, {})", min, max)
            }
            GeneratorError::EmptyWindow => write!(f, "Generation window is empty"),
        }
    }
}

impl std::error::Error for GeneratorError {}

fn validate(params: &ClassParams) -> Result<(), GeneratorError> {
    if !params.drift.is_finite() {
        return Err(GeneratorError::InvalidDrift(params.drift));
    }
    if !params.volatility.is_finite() || params.volatility < 0.0 {
        return Err(GeneratorError::InvalidVolatility(params.volatility));
    }
    if !(params.base_price_min > 0.0 && params.base_price_min < params.base_price_max)
        || !params.base_price_max.is_finite()
    {
        return Err(GeneratorError::InvalidPriceRange {
            min: params.base_price_min,
            max: params.base_price_max,
        });
    }
    Ok(())
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, GeneratorError> {
    Normal::new(mean, std_dev).map_err(|_| GeneratorError::InvalidVolatility(std_dev))
}

/// Generates one bar per date following a geometric random walk.
///
/// Closes are `base * exp(cumsum(r))` with `r ~ N(drift, volatility)`. The
/// open gaps off the previous close (the base price for the first bar), and
/// the high/low sit up to 2% outside the open/close envelope.
pub fn generate_bars<R: Rng + ?Sized>(
    params: ClassParams,
    dates: &[NaiveDate],
    rng: &mut R,
) -> Result<Vec<PriceBar>, GeneratorError> {
    validate(&params)?;
    if dates.is_empty() {
        return Err(GeneratorError::EmptyWindow);
    }

    let base_price = rng.gen_range(params.base_price_min..params.base_price_max);
    let returns = normal(params.drift, params.volatility)?;
    let gap = normal(0.0, OPEN_GAP_STD)?;

    let mut bars = Vec::with_capacity(dates.len());
    let mut cumulative = 0.0;
    let mut previous_close = base_price;

    for &date in dates {
        cumulative += returns.sample(rng);
        let close = base_price * cumulative.exp();
        let open = previous_close * (1.0 + gap.sample(rng));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..BAND_WIDTH));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..BAND_WIDTH));
        let volume = rng.gen_range(MIN_VOLUME..MAX_VOLUME);

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
        previous_close = close;
    }

    Ok(bars)
}

/// Generates `count` daily returns with mild autocorrelation, volatility
/// clustering and randomly placed ±2x shock days.
pub fn generate_stress_returns<R: Rng + ?Sized>(
    params: ClassParams,
    count: usize,
    rng: &mut R,
) -> Result<Vec<f64>, GeneratorError> {
    validate(&params)?;
    if count == 0 {
        return Err(GeneratorError::EmptyWindow);
    }

    let mu = params.drift;
    let sigma = params.volatility;
    let mut returns: Vec<f64> = Vec::with_capacity(count);

    for i in 0..count {
        let value = if i == 0 {
            normal(mu, sigma)?.sample(rng)
        } else {
            let previous = returns[i - 1];
            let scale = sigma * (1.0 + CLUSTERING * previous.abs());
            AUTOCORRELATION * previous + normal(mu, scale)?.sample(rng)
        };
        returns.push(value);
    }

    let shocks = (count / SHOCK_SPACING).max(1);
    for idx in index::sample(rng, count, shocks).into_iter() {
        let sign = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        returns[idx] *= sign * SHOCK_MULTIPLIER;
    }

    Ok(returns)
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a of the ticker and a per-stream salt, joined by `0xff`
/// (never a UTF-8 byte). Fixed across platforms and toolchains.
fn ticker_hash(ticker: &Ticker, stream: &str) -> u64 {
    ticker
        .as_str()
        .bytes()
        .chain(std::iter::once(0xff))
        .chain(stream.bytes())
        .fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
}

/// Generator configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Fixes every random stream when set
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    pub fn seeded(seed: u64) -> Self {
        GeneratorConfig { seed: Some(seed) }
    }
}

/// Market data provider backed by the synthetic generators.
#[derive(Debug, Clone, Default)]
pub struct SyntheticMarketData {
    config: GeneratorConfig,
    as_of: Option<NaiveDate>,
}

impl SyntheticMarketData {
    pub fn new(config: GeneratorConfig) -> Self {
        SyntheticMarketData {
            config,
            as_of: None,
        }
    }

    /// Pins the anchor date instead of using today's date.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn config(&self) -> GeneratorConfig {
        self.config
    }

    fn anchor(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn price_rng(&self, ticker: &Ticker) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ ticker_hash(ticker, "prices")),
            None => StdRng::from_entropy(),
        }
    }

    /// The stress stream is keyed by the ticker even without a seed, so a
    /// ticker always shows the same risk profile within a deployment.
    fn stress_rng(&self, ticker: &Ticker) -> StdRng {
        let seed = self.config.seed.unwrap_or_default();
        StdRng::seed_from_u64(seed ^ ticker_hash(ticker, "stress"))
    }
}

impl MarketDataProvider for SyntheticMarketData {
    fn price_series(
        &self,
        ticker: &Ticker,
        lookback: Lookback,
    ) -> Result<PriceSeries, MarketDataError> {
        let dates = business_days(lookback, self.anchor());
        if dates.is_empty() {
            return Err(MarketDataError::InvalidLookback(format!(
                "{:?} covers no business days",
                lookback
            )));
        }

        let class: SymbolClass = ticker.class();
        let mut rng = self.price_rng(ticker);
        let bars = generate_bars(class.params(), &dates, &mut rng)?;

        log::debug!(
            "generated {} bars for {} ({})",
            bars.len(),
            ticker,
            class.as_str()
        );

        Ok(PriceSeries::new(ticker.clone(), bars))
    }

    fn return_series(&self, ticker: &Ticker, days: usize) -> Result<ReturnSeries, MarketDataError> {
        if days == 0 {
            return Err(MarketDataError::InvalidLookback(
                "return window must be at least one day".to_string(),
            ));
        }

        let dates = business_days(Lookback::BusinessDays(days), self.anchor());
        let mut rng = self.stress_rng(ticker);
        let values = generate_stress_returns(ticker.class().params(), dates.len(), &mut rng)?;

        log::debug!("generated {} stress returns for {}", values.len(), ticker);

        let points = dates
            .into_iter()
            .zip(values)
            .map(|(date, value)| ReturnPoint { date, value })
            .collect();

        Ok(ReturnSeries {
            ticker: ticker.clone(),
            points,
        })
    }

    fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_series::is_business_day;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn seeded_provider(seed: u64) -> SyntheticMarketData {
        SyntheticMarketData::new(GeneratorConfig::seeded(seed)).with_as_of(as_of())
    }

    #[test]
    fn bars_respect_ohlc_envelope_and_volume_range() {
        let provider = seeded_provider(7);
        let ticker = Ticker::new("TSLA").unwrap();
        let series = provider
            .price_series(&ticker, Lookback::Period(crate::time_series::Period::OneYear))
            .unwrap();

        assert!(!series.is_empty());
        for bar in &series.bars {
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.low > 0.0);
            assert!((MIN_VOLUME..MAX_VOLUME).contains(&bar.volume));
            assert!(is_business_day(bar.date));
        }
        assert!(series.bars.windows(2).all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let ticker = Ticker::new("AAPL").unwrap();
        let a = seeded_provider(42)
            .price_series(&ticker, Lookback::BusinessDays(50))
            .unwrap();
        let b = seeded_provider(42)
            .price_series(&ticker, Lookback::BusinessDays(50))
            .unwrap();
        let c = seeded_provider(43)
            .price_series(&ticker, Lookback::BusinessDays(50))
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a.closes(), c.closes());
    }

    #[test]
    fn different_tickers_get_different_paths() {
        let provider = seeded_provider(1);
        let aapl = provider
            .price_series(&Ticker::new("AAPL").unwrap(), Lookback::BusinessDays(20))
            .unwrap();
        let msft = provider
            .price_series(&Ticker::new("MSFT").unwrap(), Lookback::BusinessDays(20))
            .unwrap();
        assert_ne!(aapl.closes(), msft.closes());
    }

    #[test]
    fn zero_volatility_gives_deterministic_growth() {
        let params = ClassParams {
            drift: 0.001,
            volatility: 0.0,
            base_price_min: 100.0,
            base_price_max: 100.000001,
        };
        let dates = business_days(Lookback::BusinessDays(10), as_of());
        let mut rng = StdRng::seed_from_u64(3);
        let bars = generate_bars(params, &dates, &mut rng).unwrap();

        for pair in bars.windows(2) {
            let growth = pair[1].close / pair[0].close;
            assert!((growth - 0.001_f64.exp()).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let dates = business_days(Lookback::BusinessDays(5), as_of());

        let mut params = SymbolClass::Other.params();
        params.volatility = -0.1;
        assert_eq!(
            generate_bars(params, &dates, &mut rng).unwrap_err(),
            GeneratorError::InvalidVolatility(-0.1)
        );

        let mut params = SymbolClass::Other.params();
        params.base_price_min = 0.0;
        assert!(matches!(
            generate_bars(params, &dates, &mut rng),
            Err(GeneratorError::InvalidPriceRange { .. })
        ));

        assert_eq!(
            generate_bars(SymbolClass::Other.params(), &[], &mut rng).unwrap_err(),
            GeneratorError::EmptyWindow
        );
    }

    #[test]
    fn ticker_hash_is_pinned() {
        let aapl = Ticker::new("AAPL").unwrap();
        let spy = Ticker::new("SPY").unwrap();
        assert_eq!(ticker_hash(&aapl, "prices"), 15_648_749_206_985_655_758);
        assert_eq!(ticker_hash(&spy, "stress"), 3_774_359_371_490_421_874);
        assert_ne!(ticker_hash(&aapl, "prices"), ticker_hash(&aapl, "stress"));
    }

    #[test]
    fn stress_returns_follow_the_ar1_recursion_with_shocks() {
        let params = ClassParams {
            drift: 0.001,
            volatility: 0.0,
            base_price_min: 100.0,
            base_price_max: 101.0,
        };

        for (count, shocks) in [(250, 5), (30, 1), (120, 2)] {
            let mut rng = StdRng::seed_from_u64(count as u64);
            let returns = generate_stress_returns(params, count, &mut rng).unwrap();
            assert_eq!(returns.len(), count);

            let mut previous = 0.0;
            let mut shocked = 0;
            for (i, &value) in returns.iter().enumerate() {
                let expected = if i == 0 {
                    params.drift
                } else {
                    AUTOCORRELATION * previous + params.drift
                };
                if value != expected {
                    assert!(
                        value == 2.0 * expected || value == -2.0 * expected,
                        "entry {} is {} but unshocked value is {}",
                        i,
                        value,
                        expected
                    );
                    shocked += 1;
                }
                previous = expected;
            }
            assert_eq!(shocked, shocks, "shock days for {} returns", count);
        }
    }

    #[test]
    fn stress_returns_have_requested_length() {
        let mut rng = StdRng::seed_from_u64(11);
        let returns = generate_stress_returns(SymbolClass::BroadIndex.params(), 252, &mut rng)
            .unwrap();
        assert_eq!(returns.len(), 252);
        assert!(returns.iter().all(|r| r.is_finite()));

        assert_eq!(
            generate_stress_returns(SymbolClass::BroadIndex.params(), 0, &mut rng).unwrap_err(),
            GeneratorError::EmptyWindow
        );
    }

    #[test]
    fn stress_series_is_stable_per_ticker_without_seed() {
        let provider = SyntheticMarketData::default().with_as_of(as_of());
        let ticker = Ticker::new("SPY").unwrap();
        let first = provider.return_series(&ticker, 100).unwrap();
        let second = provider.return_series(&ticker, 100).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 100);
        assert_eq!(first.points.last().unwrap().date, as_of());
    }

    #[test]
    fn anchor_is_exposed_through_the_provider_trait() {
        let pinned: &dyn MarketDataProvider = &seeded_provider(1);
        assert_eq!(pinned.as_of(), Some(as_of()));
        let floating: &dyn MarketDataProvider = &SyntheticMarketData::default();
        assert_eq!(floating.as_of(), None);
    }

    #[test]
    fn empty_return_window_is_rejected() {
        let provider = seeded_provider(5);
        let result = provider.return_series(&Ticker::new("SPY").unwrap(), 0);
        assert!(matches!(result, Err(MarketDataError::InvalidLookback(_))));
    }
}
