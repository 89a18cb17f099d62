//! # pulselink-monitor — observer daemon
//!
//! Joins a relay room and folds the inbound event stream into the
//! device registry, logging each projection update. The terminal
//! counterpart of the web dashboard: same read model, no rendering.
//!
//! ## Dependency rule
//! Wiring only — the fold lives in the app crate.

mod config;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pulselink_adapter_relay_client::RelayClient;
use pulselink_app::registry::DeviceRegistry;
use pulselink_domain::room::RoomName;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cancel = CancellationToken::new();
    let url = config.relay_url()?;
    let client =
        RelayClient::connect(&url, RoomName::new(&config.relay.room), cancel.clone()).await?;
    let mut inbound = client.subscribe();
    tracing::info!(room = %config.relay.room, "observing relay room");

    let mut registry = DeviceRegistry::new();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            frame = inbound.recv() => match frame {
                Ok(message) => {
                    let Some(event) = message.into_event() else { continue };
                    let projection = registry.apply(&event);
                    tracing::info!(
                        device = %projection.id,
                        name = ?projection.name,
                        status = %projection.status,
                        value = ?projection.value,
                        unit = ?projection.unit,
                        last_event = %projection.last_event,
                        "device updated"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // At-most-once delivery; the registry just misses
                    // some intermediate values.
                    tracing::warn!(skipped, "monitor fell behind, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("relay session ended");
                    break;
                }
            }
        }
    }

    tracing::info!(devices = registry.len(), "shutting down");
    client.shutdown();
    Ok(())
}
