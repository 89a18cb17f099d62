//! Radio transport port — the capability interface the core consumes.
//!
//! The core never touches pairing, low-level encoding, or radio control;
//! it sees a transport that can connect, a link that can enumerate
//! capability groups, and a data mailbox that delivers decoded values.
//! The transport is injected into each connection at construction so
//! tests can substitute a stub — there is no ambient manager.
//!
//! Link signals are handed out at connect time, not at subscribe time:
//! peer loss must be observable for the whole life of the link, even
//! when the data subscription was rejected outright.

use std::future::Future;

use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use pulselink_domain::capability::CapabilityGroup;
use pulselink_domain::device::Device;
use pulselink_domain::error::{SubscriptionError, TransportError};
use pulselink_domain::measurement::Measurement;

/// Out-of-band signal raised by a link after it was established.
#[derive(Debug)]
pub enum LinkSignal {
    /// The peer dropped the link.
    PeerLost,
    /// The data subscription failed after it was established.
    SubscriptionFailed(SubscriptionError),
}

/// Latest-value-wins mailbox of decoded measurements.
///
/// Bounded-1 by construction: the latest decoded value overwrites any
/// prior undelivered one. Dropped intermediate values are the documented
/// contract, not an accident — there is no queue and no backpressure
/// signal to the source.
pub type DataMailbox = watch::Receiver<Option<Measurement>>;

/// Connects to peripherals over the radio.
pub trait LinkTransport: Send + Sync {
    /// Handle to one established link.
    type Link: PeripheralLink + 'static;

    /// Establish a link to the given device. The signal receiver reports
    /// peer loss and subscription failures for the link's lifetime.
    fn connect(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<(Self::Link, mpsc::Receiver<LinkSignal>), TransportError>> + Send;
}

/// One established link to a peripheral.
pub trait PeripheralLink: Send + Sync {
    /// Enumerate the peripheral's capability groups.
    fn discover_groups(
        &self,
    ) -> impl Future<Output = Result<Vec<CapabilityGroup>, TransportError>> + Send;

    /// Subscribe to one data endpoint within a group, yielding the data
    /// mailbox. Failures after this returns arrive as
    /// [`LinkSignal::SubscriptionFailed`] on the link's signal channel.
    fn subscribe(
        &self,
        group: Uuid,
        endpoint: Uuid,
    ) -> impl Future<Output = Result<DataMailbox, SubscriptionError>> + Send;

    /// Tear the link down. Callers treat failure as non-fatal — the
    /// remote side may already be unreachable.
    fn disconnect(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl<T: LinkTransport + Send + Sync> LinkTransport for std::sync::Arc<T> {
    type Link = T::Link;

    fn connect(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<(Self::Link, mpsc::Receiver<LinkSignal>), TransportError>> + Send
    {
        (**self).connect(device)
    }
}
