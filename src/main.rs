//! API Gateway teaching lab server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   GATEWAY LAB                    │
//!                      │                                                  │
//!     JSON request     │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!     ─────────────────┼─▶│  http   │───▶│ session  │───▶│   engines   │  │
//!                      │  │ server  │    │  store   │    │ route/limit │  │
//!                      │  └─────────┘    └──────────┘    │   breaker   │  │
//!                      │       │                         └─────────────┘  │
//!     JSON response    │       │         ┌──────────┐    ┌─────────────┐  │
//!     ◀────────────────┼───────┘         │ teaching │    │    tutor    │──┼──▶ Generative
//!                      │                 │  demos   │    │   client    │  │    language API
//!                      │                 └──────────┘    └─────────────┘  │
//!                      │                                                  │
//!                      │  config · observability · lifecycle              │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use gateway_lab::config::{load_config, LabConfig};
use gateway_lab::lifecycle::{startup, Shutdown};
use gateway_lab::observability::logging;

#[derive(Parser)]
#[command(name = "gateway-lab")]
#[command(about = "Interactive API gateway teaching lab", long_about = None)]
struct Args {
    /// Path to a TOML config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => LabConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gateway-lab starting");

    startup::run(config, Shutdown::new()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
