//! Device connection supervisor — one state machine per device link.
//!
//! [`DeviceConnection::start`] spawns a supervisor task that owns the
//! link, its data subscription, and its reconnect timer. The machine:
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──link + discovery ok──▶ Connected
//!      ▲                        │ failure                          │
//!      │◀───────────────────────┘ (3 s fixed delay, forever)       │
//!      │◀──────── peer link loss (3 s fixed delay) ────────────────┤
//!      │                                 subscription failure ──▶ Error
//!      └──────────── explicit disconnect, from any state ──────────┘
//! ```
//!
//! Reconnection is fixed-delay with unlimited retries — a deliberate
//! choice that tolerates transient radio loss at the cost of retrying
//! forever on permanent failure. Explicit disconnect cancels the pending
//! timer, releases the subscription, suppresses further reconnection,
//! and swallows teardown failures.
//!
//! Data takes the bounded-1 mailbox from the subscription: the supervisor
//! forwards the latest value and emits one `Data` event per delivery,
//! unthrottled. Only `Connected`/`Disconnected` transitions cross the
//! relay boundary; intermediate states surface through the state watch.
//!
//! Link signals arrive on a channel obtained at connect time, so peer
//! loss remains observable while parked in `Error` — including when the
//! subscription was rejected outright and no mailbox ever existed.

use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use pulselink_domain::device::Device;
use pulselink_domain::error::TransportError;
use pulselink_domain::event::DeviceEvent;
use pulselink_domain::link::{LinkState, LinkStatus};
use pulselink_domain::time;

use crate::ports::{DataMailbox, EventSink, LinkSignal, LinkTransport, PeripheralLink};

/// Fixed delay between a failure and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Handle to one supervised device link.
///
/// Created when a device is selected; destroyed on explicit
/// [`shutdown`](Self::shutdown) or app teardown. Dropping the handle
/// without shutdown leaves the supervisor task running detached.
pub struct DeviceConnection {
    device: Device,
    state_rx: watch::Receiver<LinkState>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceConnection {
    /// Spawn a supervisor for `device` using the injected transport and
    /// event sink, and immediately request the first connection.
    pub fn start<T, S>(device: Device, transport: T, sink: S) -> Self
    where
        T: LinkTransport + 'static,
        S: EventSink + 'static,
    {
        let (state_tx, state_rx) = watch::channel(LinkState::default());
        let cancel = CancellationToken::new();
        let supervisor = Supervisor {
            device: device.clone(),
            transport,
            sink,
            state_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(supervisor.run());
        Self {
            device,
            state_rx,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    /// The device this connection supervises.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Current link state snapshot.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state_rx.borrow().clone()
    }

    /// Watch the link state for changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    /// Explicit disconnect: cancel any pending reconnect timer, release
    /// the subscription, tear the link down, and stop the supervisor.
    ///
    /// Idempotent — a second call finds nothing left to do and returns.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                tracing::warn!(device = %self.device.id, %err, "connection supervisor task failed");
            }
        }
    }
}

/// Outcome of attending a connected session.
enum Attend {
    /// The peer dropped the link; schedule a reconnect.
    PeerLost,
    /// The subscription failed; park in `Error`.
    SubscriptionLost(String),
    /// Explicit disconnect was requested.
    Halt,
}

struct Supervisor<T, S> {
    device: Device,
    transport: T,
    sink: S,
    state_tx: watch::Sender<LinkState>,
    cancel: CancellationToken,
}

impl<T: LinkTransport, S: EventSink> Supervisor<T, S> {
    async fn run(self) {
        loop {
            self.publish(LinkState::healthy(LinkStatus::Connecting));

            let established = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                result = self.establish() => result,
            };

            let (link, mut signals, group, endpoint) = match established {
                Ok(established) => established,
                Err(err) => {
                    tracing::warn!(device = %self.device.id, %err, "link establishment failed");
                    self.publish(LinkState::failed(LinkStatus::Disconnected, err.to_string()));
                    if self.pause_before_retry().await {
                        continue;
                    }
                    break;
                }
            };

            self.publish(LinkState::healthy(LinkStatus::Connected));
            tracing::info!(device = %self.device.id, "link established");
            self.emit(DeviceEvent::Connected {
                id: self.device.id.clone(),
                name: self.device.name.clone(),
                timestamp: time::now(),
            })
            .await;

            let outcome = match link.subscribe(group, endpoint).await {
                Ok(mut data) => match self.attend(&mut data, &mut signals).await {
                    Attend::SubscriptionLost(reason) => {
                        tracing::warn!(device = %self.device.id, %reason, "data subscription failed");
                        self.publish(LinkState::failed(LinkStatus::Error, reason));
                        self.hold_in_error(&mut signals).await
                    }
                    other => other,
                },
                Err(err) => {
                    tracing::warn!(device = %self.device.id, %err, "data subscription failed");
                    self.publish(LinkState::failed(LinkStatus::Error, err.to_string()));
                    self.hold_in_error(&mut signals).await
                }
            };

            match outcome {
                Attend::PeerLost => {
                    tracing::info!(device = %self.device.id, "peer dropped the link");
                    self.publish(LinkState::healthy(LinkStatus::Disconnected));
                    self.emit(DeviceEvent::Disconnected {
                        id: self.device.id.clone(),
                        timestamp: time::now(),
                    })
                    .await;
                    self.teardown(&link).await;
                    if self.pause_before_retry().await {
                        continue;
                    }
                    break;
                }
                Attend::Halt => {
                    self.emit(DeviceEvent::Disconnected {
                        id: self.device.id.clone(),
                        timestamp: time::now(),
                    })
                    .await;
                    self.teardown(&link).await;
                    break;
                }
                Attend::SubscriptionLost(_) => unreachable!("handled before the outcome match"),
            }
        }

        let last_error = self.state_tx.borrow().last_error.clone();
        self.publish(LinkState {
            status: LinkStatus::Disconnected,
            last_error,
        });
        tracing::debug!(device = %self.device.id, "connection supervisor stopped");
    }

    /// Connect and discover, yielding the link, its signal channel, and
    /// the first capability group that has an addressable endpoint.
    async fn establish(
        &self,
    ) -> Result<(T::Link, mpsc::Receiver<LinkSignal>, Uuid, Uuid), TransportError> {
        let (link, signals) = self.transport.connect(&self.device).await?;
        let groups = link.discover_groups().await?;
        let Some((group, endpoint)) = groups
            .iter()
            .find_map(|group| group.first_endpoint().map(|endpoint| (group.id, endpoint)))
        else {
            return Err(TransportError::NoCapabilities);
        };
        Ok((link, signals, group, endpoint))
    }

    /// Consume the data mailbox until something ends the session.
    async fn attend(
        &self,
        data: &mut DataMailbox,
        signals: &mut mpsc::Receiver<LinkSignal>,
    ) -> Attend {
        let mut signals_open = true;
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Attend::Halt,
                signal = signals.recv(), if signals_open => match signal {
                    Some(LinkSignal::PeerLost) => return Attend::PeerLost,
                    Some(LinkSignal::SubscriptionFailed(err)) => {
                        return Attend::SubscriptionLost(err.reason);
                    }
                    None => signals_open = false,
                },
                changed = data.changed() => {
                    if changed.is_err() {
                        // The link side of the mailbox is gone.
                        return Attend::PeerLost;
                    }
                    let latest = data.borrow_and_update().clone();
                    if let Some(measurement) = latest {
                        self.emit(DeviceEvent::Data {
                            id: self.device.id.clone(),
                            value: measurement.value,
                            unit: measurement.unit,
                            timestamp: time::now(),
                        })
                        .await;
                    }
                }
            }
        }
    }

    /// Park in `Error` until an external trigger: a peer-initiated link
    /// loss starts a fresh reconnect cycle, explicit disconnect halts.
    async fn hold_in_error(&self, signals: &mut mpsc::Receiver<LinkSignal>) -> Attend {
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Attend::Halt,
                signal = signals.recv() => match signal {
                    Some(LinkSignal::PeerLost) => return Attend::PeerLost,
                    Some(LinkSignal::SubscriptionFailed(_)) => {}
                    None => {
                        self.cancel.cancelled().await;
                        return Attend::Halt;
                    }
                },
            }
        }
    }

    /// Wait out the fixed reconnect delay. Returns `false` when explicit
    /// disconnect arrived during the wait.
    async fn pause_before_retry(&self) -> bool {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(RECONNECT_DELAY) => {
                let last_error = self.state_tx.borrow().last_error.clone();
                self.publish(LinkState {
                    status: LinkStatus::Reconnecting,
                    last_error,
                });
                true
            }
        }
    }

    async fn teardown(&self, link: &T::Link) {
        if let Err(err) = link.disconnect().await {
            // The remote side may already be unreachable.
            tracing::debug!(device = %self.device.id, %err, "link teardown failed");
        }
    }

    async fn emit(&self, event: DeviceEvent) {
        if let Err(err) = self.sink.emit(event).await {
            tracing::warn!(device = %self.device.id, %err, "failed to deliver event to relay");
        }
    }

    fn publish(&self, state: LinkState) {
        self.state_tx.send_replace(state);
    }
}
