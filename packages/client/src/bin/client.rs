//! Load generator and validation harness for the wschat hub.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin wschat-client -- --addr ws://127.0.0.1:8000/ -c 10 --mpc 100 --test
//! ```

use clap::Parser;
use wschat_client::HarnessArgs;
use wschat_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = HarnessArgs::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    if let Err(e) = wschat_client::run_client(args).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
