//! REST API server for the dashboard

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, SharedProvider};

use crate::config::{AppConfig, APP_TITLE, APP_VERSION};
use crate::generator::{GeneratorConfig, SyntheticMarketData};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Server bind address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server host address (default: "127.0.0.1")
    pub host: String,
    /// Server port (default: 8502)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: crate::config::DEFAULT_HOST.to_string(),
            port: crate::config::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ServerConfig {
            host: host.into(),
            port,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Runs the API server over synthetic market data
///
/// # Arguments
/// * `config` - Application configuration, usually from [`AppConfig::from_env`]
///
/// # Returns
/// Returns an error if the server fails to bind or encounters a fatal error
///
/// # Example
/// ```rust,no_run
/// use finrisk::{run_server, AppConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::from_env()?;
///     run_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let provider = SyntheticMarketData::new(GeneratorConfig { seed: config.seed });
    let addr = config.server.address();
    let state = Arc::new(AppState::new(Arc::new(provider), config));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("{} v{} listening on http://{}", APP_TITLE, APP_VERSION, addr);

    axum::serve(listener, app).await?;

    Ok(())
}
