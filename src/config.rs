//! Application configuration from `FINRISK_*` environment variables.

use crate::analytics::RiskParams;
use crate::server::ServerConfig;
use std::fmt;
use std::str::FromStr;

pub const APP_TITLE: &str = "FinRisk Pro";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8502;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
pub const DEFAULT_RISK_FREE: f64 = 0.02;
pub const DEFAULT_WINDOW: usize = 252;
pub const DEFAULT_REPORT_HISTORY: usize = 50;

/// Bounds of the dashboard controls.
pub const CONFIDENCE_RANGE: (f64, f64) = (0.90, 0.99);
pub const LOOKBACK_RANGE: (usize, usize) = (30, 1000);
pub const RISK_FREE_RANGE: (f64, f64) = (0.0, 0.20);

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "Invalid value '{}' for {}: {}", value, key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Defaults applied when a risk request leaves a parameter out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskDefaults {
    pub confidence: f64,
    pub risk_free_rate: f64,
    /// Lookback in business days
    pub window: usize,
}

impl Default for RiskDefaults {
    fn default() -> Self {
        RiskDefaults {
            confidence: DEFAULT_CONFIDENCE,
            risk_free_rate: DEFAULT_RISK_FREE,
            window: DEFAULT_WINDOW,
        }
    }
}

impl RiskDefaults {
    pub fn params(&self) -> RiskParams {
        RiskParams {
            confidence: self.confidence,
            risk_free_rate: self.risk_free_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub risk: RiskDefaults,
    /// Reports kept in memory before the oldest is evicted
    pub report_history: usize,
    /// Fixes the synthetic market data; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            risk: RiskDefaults::default(),
            report_history: DEFAULT_REPORT_HISTORY,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("FINRISK_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse(&lookup, "FINRISK_PORT")?.unwrap_or(DEFAULT_PORT);

        let confidence = parse(&lookup, "FINRISK_CONFIDENCE")?.unwrap_or(DEFAULT_CONFIDENCE);
        let (low, high) = CONFIDENCE_RANGE;
        if !(low..=high).contains(&confidence) {
            return Err(invalid(
                "FINRISK_CONFIDENCE",
                confidence,
                format!("must be between {} and {}", low, high),
            ));
        }

        let risk_free_rate: f64 =
            parse(&lookup, "FINRISK_RISK_FREE")?.unwrap_or(DEFAULT_RISK_FREE);
        let (min_rate, max_rate) = RISK_FREE_RANGE;
        if !(min_rate..=max_rate).contains(&risk_free_rate) {
            return Err(invalid(
                "FINRISK_RISK_FREE",
                risk_free_rate,
                format!("must be between {} and {}", min_rate, max_rate),
            ));
        }

        let window = parse(&lookup, "FINRISK_WINDOW")?.unwrap_or(DEFAULT_WINDOW);
        let (min_window, max_window) = LOOKBACK_RANGE;
        if !(min_window..=max_window).contains(&window) {
            return Err(invalid(
                "FINRISK_WINDOW",
                window,
                format!("must be between {} and {}", min_window, max_window),
            ));
        }

        let report_history =
            parse(&lookup, "FINRISK_REPORT_HISTORY")?.unwrap_or(DEFAULT_REPORT_HISTORY);
        if report_history == 0 {
            return Err(invalid("FINRISK_REPORT_HISTORY", 0, "must be positive"));
        }

        let seed = parse(&lookup, "FINRISK_SEED")?;

        Ok(AppConfig {
            server: ServerConfig::new(host, port),
            risk: RiskDefaults {
                confidence,
                risk_free_rate,
                window,
            },
            report_history,
            seed,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(key, raw.clone(), e.to_string())),
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8502);
        assert_eq!(config.risk, RiskDefaults::default());
        assert_eq!(config.report_history, 50);
        assert_eq!(config.seed, None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("FINRISK_HOST", "0.0.0.0"),
            ("FINRISK_PORT", "9000"),
            ("FINRISK_CONFIDENCE", "0.99"),
            ("FINRISK_RISK_FREE", "0.035"),
            ("FINRISK_WINDOW", " 500 "),
            ("FINRISK_REPORT_HISTORY", "5"),
            ("FINRISK_SEED", "42"),
        ])
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.risk.confidence, 0.99);
        assert_eq!(config.risk.risk_free_rate, 0.035);
        assert_eq!(config.risk.window, 500);
        assert_eq!(config.report_history, 5);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn rejects_bad_values() {
        let err = config(&[("FINRISK_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FINRISK_PORT", .. }));
        assert!(config(&[("FINRISK_CONFIDENCE", "0.5")]).is_err());
        assert!(config(&[("FINRISK_WINDOW", "10")]).is_err());
        assert!(config(&[("FINRISK_REPORT_HISTORY", "0")]).is_err());
        assert!(config(&[("FINRISK_RISK_FREE", "NaN")]).is_err());
    }
}
