//! WebSocket broadcast hub.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin wschat-server -- --addr 127.0.0.1:8000
//! ```

use clap::Parser;
use wschat_server::ServerConfig;
use wschat_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    // Run the server
    if let Err(e) = wschat_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
