//! GATT link transport.
//!
//! A capability group is a GATT service, an endpoint is a
//! characteristic. Connecting spawns a watcher on the central's event
//! stream so peer loss is reported for the link's whole lifetime;
//! subscribing spawns a pump task that decodes each notification into
//! the latest-value-wins mailbox.

use std::sync::Mutex;

use btleplug::api::{Central as _, CentralEvent, Manager as _, Peripheral as _};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;
use uuid::Uuid;

use pulselink_app::ports::{DataMailbox, LinkSignal, LinkTransport, PeripheralLink};
use pulselink_domain::capability::CapabilityGroup;
use pulselink_domain::device::Device;
use pulselink_domain::error::{SubscriptionError, TransportError};

use crate::config::BleConfig;
use crate::decode;
use crate::error::{self, BleError};

/// Depth of the out-of-band signal channel. Signals are rare; the
/// watcher stops after reporting peer loss.
const SIGNAL_BUFFER: usize = 4;

/// Connects to peripherals previously reported by the scanner.
pub struct BleTransport {
    central: Adapter,
    config: BleConfig,
}

impl BleTransport {
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
        Ok(Self { central, config })
    }

    async fn find_peripheral(&self, device: &Device) -> Result<Peripheral, TransportError> {
        let peripherals = self
            .central
            .peripherals()
            .await
            .map_err(error::connect_error)?;
        for peripheral in peripherals {
            if peripheral.id().to_string() == device.id.as_str() {
                return Ok(peripheral);
            }
        }
        Err(TransportError::Connect(format!(
            "peripheral {} not known to the adapter",
            device.id
        )))
    }
}

impl LinkTransport for BleTransport {
    type Link = BleLink;

    async fn connect(
        &self,
        device: &Device,
    ) -> Result<(Self::Link, mpsc::Receiver<LinkSignal>), TransportError> {
        let peripheral = self.find_peripheral(device).await?;
        peripheral.connect().await.map_err(error::connect_error)?;

        let central_events = self
            .central
            .events()
            .await
            .map_err(error::connect_error)?;
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_BUFFER);
        let watcher = tokio::spawn(watch_peer(
            peripheral.id(),
            central_events,
            signal_tx.clone(),
        ));

        tracing::info!(device = %device.id, "GATT link established");
        let link = BleLink {
            peripheral,
            config: self.config.clone(),
            signals: signal_tx,
            tasks: Mutex::new(vec![watcher]),
        };
        Ok((link, signal_rx))
    }
}

/// One established GATT link.
pub struct BleLink {
    peripheral: Peripheral,
    config: BleConfig,
    signals: mpsc::Sender<LinkSignal>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PeripheralLink for BleLink {
    async fn discover_groups(&self) -> Result<Vec<CapabilityGroup>, TransportError> {
        self.peripheral
            .discover_services()
            .await
            .map_err(error::discovery_error)?;
        let groups = self
            .peripheral
            .services()
            .into_iter()
            .map(|service| {
                CapabilityGroup::new(
                    service.uuid,
                    service
                        .characteristics
                        .into_iter()
                        .map(|characteristic| characteristic.uuid)
                        .collect(),
                )
            })
            .collect();
        Ok(groups)
    }

    async fn subscribe(
        &self,
        group: Uuid,
        endpoint: Uuid,
    ) -> Result<DataMailbox, SubscriptionError> {
        let characteristic = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.service_uuid == group && c.uuid == endpoint)
            .ok_or_else(|| {
                SubscriptionError::new(format!("characteristic {endpoint} not found in {group}"))
            })?;

        self.peripheral
            .subscribe(&characteristic)
            .await
            .map_err(|err| error::subscribe_error(&err))?;

        let notifications = self
            .peripheral
            .notifications()
            .await
            .map_err(|err| error::subscribe_error(&err))?;

        let (data_tx, data_rx) = watch::channel(None);
        let handle = tokio::spawn(pump(
            self.peripheral.id(),
            endpoint,
            self.config.unit.clone(),
            notifications,
            data_tx,
            self.signals.clone(),
        ));
        self.tasks.lock().expect("task lock poisoned").push(handle);

        tracing::info!(peripheral = %self.peripheral.id(), %endpoint, "subscribed to notifications");
        Ok(data_rx)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let tasks = std::mem::take(&mut *self.tasks.lock().expect("task lock poisoned"));
        for task in tasks {
            task.abort();
        }
        self.peripheral
            .disconnect()
            .await
            .map_err(error::connect_error)?;
        tracing::info!(peripheral = %self.peripheral.id(), "GATT link closed");
        Ok(())
    }
}

/// Report peer loss when the central says the peripheral is gone, or
/// when the central's event stream itself ends.
async fn watch_peer(
    id: PeripheralId,
    mut central_events: std::pin::Pin<Box<dyn tokio_stream::Stream<Item = CentralEvent> + Send>>,
    signals: mpsc::Sender<LinkSignal>,
) {
    loop {
        match central_events.next().await {
            Some(CentralEvent::DeviceDisconnected(gone)) if gone == id => {
                tracing::info!(peripheral = %id, "peer dropped the link");
                let _ = signals.send(LinkSignal::PeerLost).await;
                break;
            }
            Some(_) => {}
            None => {
                let _ = signals.send(LinkSignal::PeerLost).await;
                break;
            }
        }
    }
}

/// Forward decoded notifications into the mailbox until the stream ends.
async fn pump(
    id: PeripheralId,
    endpoint: Uuid,
    unit: String,
    mut notifications: std::pin::Pin<
        Box<dyn tokio_stream::Stream<Item = btleplug::api::ValueNotification> + Send>,
    >,
    data: watch::Sender<Option<pulselink_domain::measurement::Measurement>>,
    signals: mpsc::Sender<LinkSignal>,
) {
    while let Some(notification) = notifications.next().await {
        if notification.uuid != endpoint {
            continue;
        }
        match decode::decode(endpoint, &notification.value, &unit) {
            Some(measurement) => {
                // Receiver gone means the supervisor is tearing down.
                if data.send(Some(measurement)).is_err() {
                    return;
                }
            }
            None => {
                tracing::debug!(peripheral = %id, payload_len = notification.value.len(),
                    "undecodable notification dropped");
            }
        }
    }
    // The notification stream ended while the link was up.
    let _ = signals
        .send(LinkSignal::SubscriptionFailed(SubscriptionError::new(
            "notification stream ended",
        )))
        .await;
}
