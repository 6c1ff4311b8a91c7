//! Watch-party server: room directory, ingest webhooks and WebSocket chat relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin streamcircle-server -- --admin-token secret
//! cargo run --bin streamcircle-server -- --host 0.0.0.0 --port 4000 --database-url sqlite://streamcircle.db --admin-token secret
//! ```

use clap::Parser;
use streamcircle_server::{bootstrap::build_app, config::Config};
use streamcircle_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Load .env before clap reads the environment
    dotenv::dotenv().ok();

    let config = Config::parse();

    // Initialize tracing
    setup_logger("streamcircle_server", env!("CARGO_BIN_NAME"), &config.log_level);

    let server = match build_app(&config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to initialize the store: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(config.host.clone(), config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
