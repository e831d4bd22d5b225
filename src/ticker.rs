use serde::Serialize;
use std::fmt;

/// Validated ticker symbol.
///
/// Tickers are trimmed and upper-cased on construction, so `" aapl "` and
/// `"AAPL"` produce the same key. Besides alphanumerics the symbol may contain
/// the punctuation used by index, FX and futures tickers (`.`, `-`, `=`, `^`, `_`),
/// which keeps inputs like `BTC-USD` and `GC=F` valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker from user input.
    ///
    /// # Errors
    /// Returns an error if the symbol is empty after trimming or contains
    /// characters outside the allowed set.
    pub fn new(symbol: impl AsRef<str>) -> Result<Self, TickerError> {
        let symbol = symbol.as_ref().trim().to_uppercase();
        Self::validate(&symbol)?;
        Ok(Ticker(symbol))
    }

    fn validate(symbol: &str) -> Result<(), TickerError> {
        if symbol.is_empty() {
            return Err(TickerError::Empty);
        }

        if symbol.len() > 16 {
            return Err(TickerError::TooLong(symbol.len()));
        }

        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '=' | '^' | '_'))
        {
            return Err(TickerError::InvalidCharacters(symbol.to_string()));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symbol class used to pick generator parameters.
    pub fn class(&self) -> SymbolClass {
        SymbolClass::classify(&self.0)
    }

    /// Display name from the sample catalog, if the ticker is listed there.
    pub fn display_name(&self) -> Option<&'static str> {
        SAMPLE_STOCKS
            .iter()
            .find(|(symbol, _)| *symbol == self.0)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing a ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerError {
    /// The symbol is empty
    Empty,
    /// The symbol is longer than any listed instrument
    TooLong(usize),
    /// The symbol contains invalid characters
    InvalidCharacters(String),
}

impl fmt::Display for TickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickerError::Empty => write!(f, "Ticker cannot be empty"),
            TickerError::TooLong(len) => {
                write!(f, "Ticker is too long ({} characters, max 16)", len)
            }
            TickerError::InvalidCharacters(symbol) => {
                write!(f, "Ticker '{}' contains invalid characters", symbol)
            }
        }
    }
}

impl std::error::Error for TickerError {}

/// Coarse instrument class driving the synthetic drift/volatility pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolClass {
    /// Mega-cap technology names
    LargeCap,
    /// High-beta growth names
    HighGrowth,
    /// Broad market index ETFs
    BroadIndex,
    /// Everything else
    Other,
}

/// Fixed parameters of the synthetic return process for one symbol class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassParams {
    /// Mean daily log return
    pub drift: f64,
    /// Standard deviation of the daily log return
    pub volatility: f64,
    /// Lower bound of the uniformly drawn starting price
    pub base_price_min: f64,
    /// Upper bound (exclusive) of the uniformly drawn starting price
    pub base_price_max: f64,
}

impl SymbolClass {
    pub fn classify(symbol: &str) -> Self {
        match symbol {
            "AAPL" | "MSFT" | "GOOGL" | "AMZN" => SymbolClass::LargeCap,
            "TSLA" | "NVDA" => SymbolClass::HighGrowth,
            "SPY" | "VTI" | "QQQ" => SymbolClass::BroadIndex,
            _ => SymbolClass::Other,
        }
    }

    pub fn params(&self) -> ClassParams {
        match self {
            SymbolClass::LargeCap => ClassParams {
                drift: 0.0005,
                volatility: 0.015,
                base_price_min: 100.0,
                base_price_max: 500.0,
            },
            SymbolClass::HighGrowth => ClassParams {
                drift: 0.0008,
                volatility: 0.025,
                base_price_min: 50.0,
                base_price_max: 300.0,
            },
            SymbolClass::BroadIndex => ClassParams {
                drift: 0.0003,
                volatility: 0.012,
                base_price_min: 200.0,
                base_price_max: 500.0,
            },
            SymbolClass::Other => ClassParams {
                drift: 0.0004,
                volatility: 0.018,
                base_price_min: 50.0,
                base_price_max: 200.0,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolClass::LargeCap => "large_cap",
            SymbolClass::HighGrowth => "high_growth",
            SymbolClass::BroadIndex => "broad_index",
            SymbolClass::Other => "other",
        }
    }
}

/// Sample universe shown in the ticker picker.
pub const SAMPLE_STOCKS: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("TSLA", "Tesla Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
    ("JNJ", "Johnson & Johnson"),
    ("WMT", "Walmart Inc."),
    ("PG", "Procter & Gamble Co."),
    ("SPY", "SPDR S&P 500 ETF"),
    ("QQQ", "Invesco QQQ Trust"),
    ("VTI", "Vanguard Total Stock Market ETF"),
];

/// Quick-pick tickers for the stock page.
pub const HOT_STOCKS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "JPM", "JNJ", "SPY", "QQQ",
];

/// Quick-pick assets for the risk page.
pub const HOT_RISK_ASSETS: &[&str] = &["SPY", "AAPL", "TSLA", "BTC-USD", "GC=F"];

/// Named example portfolios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioPreset {
    /// Technology heavy basket
    Tech,
    /// Defensive large caps plus the index
    Stable,
}

impl PortfolioPreset {
    pub const ALL: [PortfolioPreset; 2] = [PortfolioPreset::Tech, PortfolioPreset::Stable];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "tech" => Some(PortfolioPreset::Tech),
            "stable" => Some(PortfolioPreset::Stable),
            _ => None,
        }
    }

    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            PortfolioPreset::Tech => &["AAPL", "MSFT", "GOOGL", "NVDA", "TSLA"],
            PortfolioPreset::Stable => &["JPM", "JNJ", "WMT", "PG", "SPY"],
        }
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        self.symbols()
            .iter()
            .map(|symbol| Ticker(symbol.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalizes_case_and_whitespace() {
        let ticker = Ticker::new("  aapl ").unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
        assert_eq!(ticker, Ticker::new("AAPL").unwrap());
    }

    #[test]
    fn test_ticker_empty() {
        assert_eq!(Ticker::new("   ").unwrap_err(), TickerError::Empty);
    }

    #[test]
    fn test_ticker_invalid_characters() {
        let result = Ticker::new("AAPL@");
        assert_eq!(
            result.unwrap_err(),
            TickerError::InvalidCharacters("AAPL@".to_string())
        );
    }

    #[test]
    fn test_ticker_accepts_index_and_futures_symbols() {
        assert!(Ticker::new("BTC-USD").is_ok());
        assert!(Ticker::new("GC=F").is_ok());
        assert!(Ticker::new("^GSPC").is_ok());
    }

    #[test]
    fn test_ticker_too_long() {
        let result = Ticker::new("ABCDEFGHIJKLMNOPQ");
        assert_eq!(result.unwrap_err(), TickerError::TooLong(17));
    }

    #[test]
    fn test_symbol_class_lookup() {
        assert_eq!(Ticker::new("msft").unwrap().class(), SymbolClass::LargeCap);
        assert_eq!(Ticker::new("NVDA").unwrap().class(), SymbolClass::HighGrowth);
        assert_eq!(Ticker::new("VTI").unwrap().class(), SymbolClass::BroadIndex);
        assert_eq!(Ticker::new("JPM").unwrap().class(), SymbolClass::Other);
    }

    #[test]
    fn test_class_params_match_profiles() {
        let growth = SymbolClass::HighGrowth.params();
        assert_eq!(growth.drift, 0.0008);
        assert_eq!(growth.volatility, 0.025);

        let index = SymbolClass::BroadIndex.params();
        assert!(index.volatility < SymbolClass::Other.params().volatility);
        assert!(index.base_price_min < index.base_price_max);
    }

    #[test]
    fn test_display_name_from_catalog() {
        assert_eq!(
            Ticker::new("spy").unwrap().display_name(),
            Some("SPDR S&P 500 ETF")
        );
        assert_eq!(Ticker::new("XYZ").unwrap().display_name(), None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(PortfolioPreset::parse("Tech"), Some(PortfolioPreset::Tech));
        assert_eq!(PortfolioPreset::parse("growth"), None);
        let stable = PortfolioPreset::Stable.tickers();
        assert_eq!(stable.len(), 5);
        assert_eq!(stable[4].as_str(), "SPY");
    }

    #[test]
    fn test_ticker_hashable() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Ticker::new("AAPL").unwrap(), "Apple Inc.");
        assert_eq!(map.get(&Ticker::new("aapl").unwrap()), Some(&"Apple Inc."));
        assert_eq!(map.get(&Ticker::new("MSFT").unwrap()), None);
    }
}
