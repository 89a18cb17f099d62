//! # pulselink-bridge — device-side daemon
//!
//! Composition root for the bridge: joins the relay room, scans for the
//! first matching peripheral, then hands the link to the connection
//! supervisor, which keeps it alive and relays its events until
//! interrupted.
//!
//! ## Dependency rule
//! Wiring only — supervision and protocol logic live in the app and
//! adapter crates.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pulselink_adapter_ble::{BleScanner, BleTransport};
use pulselink_adapter_relay_client::RelayClient;
use pulselink_app::connection::DeviceConnection;
use pulselink_app::scan::ScanService;
use pulselink_domain::device::Device;
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
    let client = Arc::new(
        RelayClient::connect(&url, RoomName::new(&config.relay.room), cancel.child_token())
            .await?,
    );
    tracing::info!(room = %config.relay.room, "joined relay room");

    let transport = Arc::new(BleTransport::new(config.ble.clone()).await?);
    let scan = ScanService::new(BleScanner::new(config.ble.clone()).await?);

    let device = discover_first(&scan, Duration::from_secs(config.scan.timeout_secs)).await?;
    tracing::info!(device = %device.id, name = ?device.name, "peripheral selected");

    let connection = DeviceConnection::start(device, transport, Arc::clone(&client));

    // Surface every link state transition in the logs; intermediate
    // states never cross the relay boundary.
    let mut state_rx = connection.watch_state();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            tracing::info!(status = %state.status, error = ?state.last_error, "link state");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    connection.shutdown().await;
    client.shutdown();
    Ok(())
}

/// Scan until the first matching peripheral shows up, then stop the scan.
async fn discover_first(
    scan: &ScanService<BleScanner>,
    timeout: Duration,
) -> anyhow::Result<Device> {
    let (found_tx, mut found_rx) = mpsc::channel(16);
    scan.start_scan(found_tx).await?;

    let device = tokio::time::timeout(timeout, found_rx.recv()).await;
    scan.stop_scan().await?;

    match device {
        Ok(Some(device)) => Ok(device),
        Ok(None) => anyhow::bail!("scan ended before any peripheral was found"),
        Err(_) => anyhow::bail!("no matching peripheral found within {}s", timeout.as_secs()),
    }
}
