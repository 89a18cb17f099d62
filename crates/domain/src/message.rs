//! Wire protocol spoken between clients and the relay hub.
//!
//! JSON frames, internally tagged on a `type` field. Device events carry
//! a `room` tag that the hub uses for routing and never rewrites.
//! Timestamps travel as epoch milliseconds. There is no acknowledgment
//! and no schema version field; anyone adding durability guarantees
//! should introduce one.

use serde::{Deserialize, Serialize};

use crate::event::DeviceEvent;
use crate::id::DeviceId;
use crate::room::RoomName;
use crate::time::Timestamp;

/// One frame of the relay protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    /// Set (replacing) this session's room membership.
    Join {
        /// Room to join; replaces any previous membership.
        room: RoomName,
    },
    /// A device link came up.
    DeviceConnected {
        /// Transport id of the device.
        id: DeviceId,
        /// Advertised name, when known.
        #[serde(default)]
        name: Option<String>,
        /// Event time, epoch milliseconds on the wire.
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: Timestamp,
        /// Routing tag.
        room: RoomName,
    },
    /// A decoded telemetry value.
    DeviceData {
        /// Transport id of the device.
        id: DeviceId,
        /// Decoded payload value.
        value: f64,
        /// Unit label.
        unit: String,
        /// Event time, epoch milliseconds on the wire.
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: Timestamp,
        /// Routing tag.
        room: RoomName,
    },
    /// A device link went away.
    DeviceDisconnected {
        /// Transport id of the device.
        id: DeviceId,
        /// Event time, epoch milliseconds on the wire.
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: Timestamp,
        /// Routing tag.
        room: RoomName,
    },
}

impl RelayMessage {
    /// Routing tag of this frame, if it is a routable device event.
    ///
    /// `Join` frames address the hub itself and carry no routing tag.
    #[must_use]
    pub fn room(&self) -> Option<&RoomName> {
        match self {
            Self::Join { .. } => None,
            Self::DeviceConnected { room, .. }
            | Self::DeviceData { room, .. }
            | Self::DeviceDisconnected { room, .. } => Some(room),
        }
    }

    /// Wrap a device event with a routing tag for the wire.
    #[must_use]
    pub fn from_event(event: DeviceEvent, room: RoomName) -> Self {
        match event {
            DeviceEvent::Connected {
                id,
                name,
                timestamp,
            } => Self::DeviceConnected {
                id,
                name,
                timestamp,
                room,
            },
            DeviceEvent::Data {
                id,
                value,
                unit,
                timestamp,
            } => Self::DeviceData {
                id,
                value,
                unit,
                timestamp,
                room,
            },
            DeviceEvent::Disconnected { id, timestamp } => Self::DeviceDisconnected {
                id,
                timestamp,
                room,
            },
        }
    }

    /// Strip the routing tag, recovering the device event.
    ///
    /// Returns `None` for `Join`, which is not a device event.
    #[must_use]
    pub fn into_event(self) -> Option<DeviceEvent> {
        match self {
            Self::Join { .. } => None,
            Self::DeviceConnected {
                id,
                name,
                timestamp,
                ..
            } => Some(DeviceEvent::Connected {
                id,
                name,
                timestamp,
            }),
            Self::DeviceData {
                id,
                value,
                unit,
                timestamp,
                ..
            } => Some(DeviceEvent::Data {
                id,
                value,
                unit,
                timestamp,
            }),
            Self::DeviceDisconnected { id, timestamp, .. } => {
                Some(DeviceEvent::Disconnected { id, timestamp })
            }
        }
    }
}
