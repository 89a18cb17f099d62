//! Device projection — the observer-side read model.
//!
//! A projection is built by folding the relay's event stream, strictly in
//! arrival order, with no cross-device ordering assumption. The fold is
//! forgiving: an event for an unseen device creates a projection instead
//! of erroring, and a disconnect retains the last value rather than
//! clearing it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::DeviceEvent;
use crate::id::DeviceId;
use crate::time::Timestamp;

/// Observer-side liveness of a device.
///
/// Coarser than the connection machine's status on purpose: observers
/// only ever learn "up" or "down" from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Last event implies the device is live.
    Connected,
    /// Last event was a disconnect.
    Disconnected,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Kind of the most recently folded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `device_connected`
    Connected,
    /// `device_data`
    Data,
    /// `device_disconnected`
    Disconnected,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Data => f.write_str("data"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Continuously updated per-device read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProjection {
    /// Transport id of the device.
    pub id: DeviceId,
    /// Last advertised name, when any event carried one.
    pub name: Option<String>,
    /// Observer-side liveness.
    pub status: Presence,
    /// Last decoded value; survives disconnects.
    pub value: Option<f64>,
    /// Unit of the last value; survives disconnects.
    pub unit: Option<String>,
    /// Kind of the most recently folded event.
    pub last_event: EventKind,
    /// Timestamp of the most recently folded event.
    pub last_update: Timestamp,
}

impl DeviceProjection {
    /// Create a projection from the first event seen for a device.
    #[must_use]
    pub fn first_seen(event: &DeviceEvent) -> Self {
        let mut projection = Self {
            id: event.device_id().clone(),
            name: None,
            status: Presence::Disconnected,
            value: None,
            unit: None,
            last_event: EventKind::Disconnected,
            last_update: event.timestamp(),
        };
        projection.apply(event);
        projection
    }

    /// Fold one event into the projection.
    ///
    /// Receipt of data implies liveness, so a `Data` event flips the
    /// status back to connected even when no `Connected` event was seen.
    pub fn apply(&mut self, event: &DeviceEvent) {
        self.last_update = event.timestamp();
        match event {
            DeviceEvent::Connected { name, .. } => {
                if name.is_some() {
                    self.name.clone_from(name);
                }
                self.status = Presence::Connected;
                self.last_event = EventKind::Connected;
            }
            DeviceEvent::Data { value, unit, .. } => {
                self.value = Some(*value);
                self.unit = Some(unit.clone());
                self.status = Presence::Connected;
                self.last_event = EventKind::Data;
            }
            DeviceEvent::Disconnected { .. } => {
                self.status = Presence::Disconnected;
                self.last_event = EventKind::Disconnected;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time;

    fn connected(id: &str, name: Option<&str>) -> DeviceEvent {
        DeviceEvent::Connected {
            id: DeviceId::new(id),
            name: name.map(str::to_owned),
            timestamp: time::now(),
        }
    }

    fn data(id: &str, value: f64) -> DeviceEvent {
        DeviceEvent::Data {
            id: DeviceId::new(id),
            value,
            unit: "bpm".into(),
            timestamp: time::now(),
        }
    }

    fn disconnected(id: &str) -> DeviceEvent {
        DeviceEvent::Disconnected {
            id: DeviceId::new(id),
            timestamp: time::now(),
        }
    }

    #[test]
    fn should_retain_value_after_disconnect() {
        let mut p = DeviceProjection::first_seen(&connected("d1", Some("HRM")));
        p.apply(&data("d1", 72.0));
        p.apply(&disconnected("d1"));

        assert_eq!(p.status, Presence::Disconnected);
        assert_eq!(p.last_event, EventKind::Disconnected);
        assert_eq!(p.value, Some(72.0));
        assert_eq!(p.unit.as_deref(), Some("bpm"));
        assert_eq!(p.name.as_deref(), Some("HRM"));
    }

    #[test]
    fn should_mark_connected_when_data_arrives_first() {
        let p = DeviceProjection::first_seen(&data("d1", 68.0));
        assert_eq!(p.status, Presence::Connected);
        assert_eq!(p.last_event, EventKind::Data);
        assert_eq!(p.value, Some(68.0));
        assert!(p.name.is_none());
    }

    #[test]
    fn should_keep_known_name_when_reconnect_carries_none() {
        let mut p = DeviceProjection::first_seen(&connected("d1", Some("HRM")));
        p.apply(&disconnected("d1"));
        p.apply(&connected("d1", None));
        assert_eq!(p.name.as_deref(), Some("HRM"));
        assert_eq!(p.status, Presence::Connected);
    }

    #[test]
    fn should_track_last_update_from_event_timestamps() {
        let first = connected("d1", None);
        let mut p = DeviceProjection::first_seen(&first);
        assert_eq!(p.last_update, first.timestamp());

        let later = data("d1", 70.0);
        p.apply(&later);
        assert_eq!(p.last_update, later.timestamp());
    }
}
