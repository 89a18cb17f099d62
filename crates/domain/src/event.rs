//! Device events — what a connection reports to the relay boundary.
//!
//! Exactly three things cross the relay: a device came up, a device
//! produced a value, a device went away. Intermediate machine states
//! (`Connecting`, `Reconnecting`, `Error`) have no event representation;
//! they are visible only through the local link state.

use crate::id::DeviceId;
use crate::time::Timestamp;

/// A lifecycle or telemetry event for one device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The link was established and the data subscription is live.
    Connected {
        /// Transport id of the device.
        id: DeviceId,
        /// Advertised name, when known.
        name: Option<String>,
        /// When the transition happened.
        timestamp: Timestamp,
    },
    /// One decoded value arrived from the data endpoint.
    Data {
        /// Transport id of the device.
        id: DeviceId,
        /// Decoded payload value.
        value: f64,
        /// Unit label ([`crate::measurement::UNKNOWN_UNIT`] when unknown).
        unit: String,
        /// When the value was received.
        timestamp: Timestamp,
    },
    /// The link was lost or released.
    Disconnected {
        /// Transport id of the device.
        id: DeviceId,
        /// When the transition happened.
        timestamp: Timestamp,
    },
}

impl DeviceEvent {
    /// The device this event refers to.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::Connected { id, .. } | Self::Data { id, .. } | Self::Disconnected { id, .. } => {
                id
            }
        }
    }

    /// When the event was produced.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Connected { timestamp, .. }
            | Self::Data { timestamp, .. }
            | Self::Disconnected { timestamp, .. } => *timestamp,
        }
    }
}
