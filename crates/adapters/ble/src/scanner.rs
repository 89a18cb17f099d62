//! BLE scanner — reports advertising peripherals on the scanner port.

use std::sync::Mutex;

use btleplug::api::{Central as _, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;

use pulselink_app::ports::DeviceScanner;
use pulselink_domain::device::Device;
use pulselink_domain::error::TransportError;

use crate::config::BleConfig;
use crate::error::{self, BleError};

/// Scans for peripherals advertising the configured service.
///
/// Discovery events are translated into [`Device`]s and pushed on the
/// channel handed to [`DeviceScanner::start`]. Re-advertisements are
/// reported again; deduplication is the consumer's concern.
pub struct BleScanner {
    central: Adapter,
    config: BleConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BleScanner {
    /// Bind to the host's first BLE adapter.
    ///
    /// # Errors
    ///
    /// Returns [`BleError::NotAvailable`] when the host has no adapter.
    pub async fn new(config: BleConfig) -> Result<Self, BleError> {
        let manager = Manager::new().await?;
        let central = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(BleError::NotAvailable)?;
        Ok(Self {
            central,
            config,
            task: Mutex::new(None),
        })
    }

    async fn report(
        central: &Adapter,
        config: &BleConfig,
        id: &btleplug::platform::PeripheralId,
        found: &mpsc::Sender<Device>,
    ) -> bool {
        let Ok(peripheral) = central.peripheral(id).await else {
            return true;
        };
        let Ok(Some(props)) = peripheral.properties().await else {
            return true;
        };
        if !config.passes_filter(props.local_name.as_deref()) {
            tracing::debug!(peripheral = %id, "filtered out by name_filter");
            return true;
        }

        let mut device = Device::new(id.to_string());
        if let Some(name) = props.local_name {
            device = device.with_name(name);
        }
        tracing::debug!(device = %device.id, name = ?device.name, "peripheral discovered");
        found.send(device).await.is_ok()
    }
}

impl DeviceScanner for BleScanner {
    async fn start(&self, found: mpsc::Sender<Device>) -> Result<(), TransportError> {
        let mut events = self.central.events().await.map_err(error::scan_error)?;
        self.central
            .start_scan(ScanFilter {
                services: vec![self.config.service],
            })
            .await
            .map_err(error::scan_error)?;
        tracing::info!(service = %self.config.service, "BLE scan started");

        let central = self.central.clone();
        let config = self.config.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                    _ => continue,
                };
                if !Self::report(&central, &config, &id, &found).await {
                    // The consumer hung up; scanning on is pointless.
                    break;
                }
            }
        });

        let mut task = self.task.lock().expect("scan task lock poisoned");
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        let previous = self
            .task
            .lock()
            .expect("scan task lock poisoned")
            .take();
        if let Some(handle) = previous {
            handle.abort();
        }
        self.central.stop_scan().await.map_err(error::scan_error)?;
        tracing::info!("BLE scan stopped");
        Ok(())
    }
}
