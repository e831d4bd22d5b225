//! Shared application state for the API server

use crate::config::AppConfig;
use crate::generator::{GeneratorConfig, SyntheticMarketData};
use crate::report::ReportStore;
use crate::time_series::MarketDataProvider;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Market data source shared across requests.
pub type SharedProvider = Arc<dyn MarketDataProvider + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Source of every price and return series
    pub provider: SharedProvider,
    /// Generated reports, newest evicting oldest
    pub reports: Arc<RwLock<ReportStore>>,
    pub config: AppConfig,
}

impl AppState {
    /// Creates a new application state
    pub fn new(provider: SharedProvider, config: AppConfig) -> Self {
        AppState {
            provider,
            reports: Arc::new(RwLock::new(ReportStore::new(config.report_history))),
            config,
        }
    }

    /// The shared provider, or a freshly seeded generator when the request
    /// pins its own seed. The seeded generator keeps the shared anchor date.
    pub fn provider_for(&self, seed: Option<u64>) -> SharedProvider {
        match seed {
            Some(seed) => {
                let mut seeded = SyntheticMarketData::new(GeneratorConfig::seeded(seed));
                if let Some(as_of) = self.provider.as_of() {
                    seeded = seeded.with_as_of(as_of);
                }
                Arc::new(seeded)
            }
            None => Arc::clone(&self.provider),
        }
    }
}
