//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start the metrics exporter when enabled
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::LabConfig;
use crate::http::{AppState, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Run the lab server until an OS signal or `shutdown` stops it.
pub async fn run(config: LabConfig, shutdown: Shutdown) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        rate_limit_capacity = config.rate_limit.capacity,
        breaker_threshold = config.circuit_breaker.failure_threshold,
        breaker_recovery_ms = config.circuit_breaker.recovery_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let state = AppState::new(config)?;
    let server = HttpServer::new(state);

    signals::spawn_signal_listener(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
