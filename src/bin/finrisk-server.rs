//! FinRisk API Server Binary
//!
//! Run with: `cargo run --bin finrisk-server`

use finrisk::config::{APP_TITLE, APP_VERSION};
use finrisk::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing is initialized in run_server(); RUST_LOG controls the level:
    //   RUST_LOG=debug cargo run --bin finrisk-server
    //   RUST_LOG=finrisk::generator=debug cargo run --bin finrisk-server

    let config = AppConfig::from_env()?;

    println!("Starting {} v{}...", APP_TITLE, APP_VERSION);
    println!("   Host: {}", config.server.host);
    println!("   Port: {}", config.server.port);
    println!(
        "   Risk defaults: confidence {}, risk-free {}, window {} days",
        config.risk.confidence, config.risk.risk_free_rate, config.risk.window
    );
    match config.seed {
        Some(seed) => println!("   Market data seed: {}", seed),
        None => println!("   Market data seed: random"),
    }
    println!();
    println!(
        "Server will be available at: http://{}",
        config.server.address()
    );
    println!();
    println!("Available endpoints:");
    println!("  GET  /health                        - Health check");
    println!("  GET  /tickers                       - Ticker catalog and presets");
    println!("  GET  /stocks/:ticker                - Price history and statistics");
    println!("  GET  /stocks/:ticker/export.csv     - Price history CSV");
    println!("  GET  /portfolio                     - Portfolio analysis");
    println!("  GET  /risk/:ticker                  - Risk metrics");
    println!("  GET  /risk/:ticker/export.csv       - Risk metrics CSV");
    println!("  GET  /reports/templates             - Report templates");
    println!("  GET  /reports                       - Report history");
    println!("  POST /reports                       - Generate report");
    println!("  GET  /reports/:id                   - Report data");
    println!("  GET  /reports/:id/download/:format  - Download html, xlsx or txt");
    println!();

    run_server(config).await?;

    Ok(())
}
