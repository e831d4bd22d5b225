pub mod ticker;
pub mod time_series;
pub mod generator;
pub mod analytics;
pub mod portfolio;
pub mod report;
pub mod export;
pub mod config;
pub mod server;

pub use ticker::{PortfolioPreset, SymbolClass, Ticker, TickerError};
pub use time_series::{
    InMemoryMarketData, Lookback, MarketDataError, MarketDataProvider, Period, PriceBar,
    PriceSeries, ReturnPoint, ReturnSeries,
};
pub use generator::{GeneratorConfig, GeneratorError, SyntheticMarketData};
pub use analytics::{AnalyticsError, PerformanceSummary, PriceStats, RiskMetrics, RiskParams};
pub use portfolio::{PortfolioAnalysis, PortfolioError, Weights};
pub use report::{Report, ReportError, ReportFormat, ReportRequest, ReportStore, ReportType};
pub use export::{ExportError, ExportFile};
pub use config::{AppConfig, ConfigError};
pub use server::{create_router, run_server, ApiError, AppState, ServerConfig};
