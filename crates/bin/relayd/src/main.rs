//! # pulselink-relayd — relay daemon
//!
//! Composition root for the relay side: builds the hub, mounts the
//! WebSocket router, binds the listener, and serves until interrupted.
//!
//! ## Dependency rule
//! Wiring only — no routing or protocol logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pulselink_adapter_relay_axum::{RelayHub, router};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let hub = Arc::new(RelayHub::new());
    let app = router::build(hub);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "relayd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("relayd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for shutdown signal");
    }
}
