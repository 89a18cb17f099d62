//! Room registry and fan-out.
//!
//! Membership is a single optional room per session, replaced atomically
//! under one lock on `join` — there is no window between leaving the old
//! room and receiving broadcasts for the new one. Fan-out uses
//! non-blocking `try_send` into each session's bounded buffer, so a slow
//! recipient drops frames for itself and never delays the others.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;

use pulselink_domain::id::SessionId;
use pulselink_domain::message::RelayMessage;
use pulselink_domain::room::RoomName;

/// Per-session outbound buffer size. A session that falls this far
/// behind starts losing frames — the documented at-most-once contract.
pub const SESSION_BUFFER: usize = 64;

struct SessionEntry {
    room: Option<RoomName>,
    tx: mpsc::Sender<RelayMessage>,
}

/// The relay's only state: who is connected, and which room each
/// session is in.
#[derive(Default)]
pub struct RelayHub {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl RelayHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session; the receiver is the session's outbound
    /// frame stream. The session starts in no room.
    pub fn register(&self) -> (SessionId, mpsc::Receiver<RelayMessage>) {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        let id = SessionId::new();
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(id, SessionEntry { room: None, tx });
        (id, rx)
    }

    /// Remove a session. Membership disappears with it; no explicit
    /// leave message exists in the protocol.
    pub fn deregister(&self, id: SessionId) {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .remove(&id);
    }

    /// Set (replacing) a session's room membership. Last join wins.
    ///
    /// An empty room name is unroutable and the join is dropped with a
    /// warning.
    pub fn join(&self, id: SessionId, room: RoomName) {
        if room.is_empty() {
            tracing::warn!(session = %id, "join with empty room name dropped");
            return;
        }
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        if let Some(entry) = sessions.get_mut(&id) {
            tracing::debug!(session = %id, %room, "session joined room");
            entry.room = Some(room);
        }
    }

    /// Fan a device event out to every member of its tagged room,
    /// including the sender. Returns the number of sessions the frame
    /// was handed to.
    ///
    /// Frames without a usable room tag are dropped with a warning —
    /// nothing is surfaced to the sender. A full session buffer drops
    /// the frame for that session only.
    pub fn route(&self, message: &RelayMessage) -> usize {
        let Some(room) = message.room().filter(|room| !room.is_empty()) else {
            tracing::warn!("frame without usable room tag dropped");
            return 0;
        };

        let sessions = self.sessions.read().expect("session lock poisoned");
        let mut delivered = 0;
        for (id, entry) in sessions.iter() {
            if entry.room.as_ref() != Some(room) {
                continue;
            }
            match entry.tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!(session = %id, %room, "session buffer full, frame dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // The session is going away; deregistration races us.
                }
            }
        }
        tracing::trace!(%room, delivered, "frame routed");
        delivered
    }

    /// Number of currently registered sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.read().expect("session lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use pulselink_domain::id::DeviceId;
    use pulselink_domain::time::Timestamp;

    fn ts() -> Timestamp {
        chrono::Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn data_frame(room: &str) -> RelayMessage {
        RelayMessage::DeviceData {
            id: DeviceId::new("X"),
            value: 72.0,
            unit: "bpm".into(),
            timestamp: ts(),
            room: RoomName::new(room),
        }
    }

    #[test]
    fn should_deliver_to_room_members_only() {
        let hub = RelayHub::new();
        let (a, mut rx_a) = hub.register();
        let (b, mut rx_b) = hub.register();
        let (c, mut rx_c) = hub.register();
        let (d, mut rx_d) = hub.register();
        hub.join(a, RoomName::new("r1"));
        hub.join(b, RoomName::new("r1"));
        hub.join(c, RoomName::new("r1"));
        hub.join(d, RoomName::new("r2"));

        let delivered = hub.route(&data_frame("r1"));

        assert_eq!(delivered, 3);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
        assert!(rx_d.try_recv().is_err());
    }

    #[test]
    fn should_not_deliver_to_old_room_after_switch() {
        let hub = RelayHub::new();
        let (id, mut rx) = hub.register();
        hub.join(id, RoomName::new("a"));
        hub.join(id, RoomName::new("b"));

        assert_eq!(hub.route(&data_frame("a")), 0);
        assert!(rx.try_recv().is_err());

        assert_eq!(hub.route(&data_frame("b")), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn should_include_sender_in_fan_out() {
        // The hub cannot tell the sender apart — everyone in the room
        // gets the frame, which is what the protocol specifies.
        let hub = RelayHub::new();
        let (id, mut rx) = hub.register();
        hub.join(id, RoomName::new("r1"));

        assert_eq!(hub.route(&data_frame("r1")), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn should_drop_frame_with_empty_room_tag() {
        let hub = RelayHub::new();
        let (id, mut rx) = hub.register();
        hub.join(id, RoomName::new("r1"));

        assert_eq!(hub.route(&data_frame("")), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_ignore_join_with_empty_room_name() {
        let hub = RelayHub::new();
        let (id, mut rx) = hub.register();
        hub.join(id, RoomName::new(""));

        assert_eq!(hub.route(&data_frame("")), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_not_deliver_to_sessions_without_membership() {
        let hub = RelayHub::new();
        let (_id, mut rx) = hub.register();

        assert_eq!(hub.route(&data_frame("r1")), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_forget_membership_on_deregister() {
        let hub = RelayHub::new();
        let (id, _rx) = hub.register();
        hub.join(id, RoomName::new("r1"));
        hub.deregister(id);

        assert_eq!(hub.session_count(), 0);
        assert_eq!(hub.route(&data_frame("r1")), 0);
    }

    #[test]
    fn should_drop_frames_for_slow_session_without_blocking() {
        let hub = RelayHub::new();
        let (id, mut rx) = hub.register();
        hub.join(id, RoomName::new("r1"));

        // Overfill the session buffer; the overflow is dropped for this
        // session while route keeps returning promptly.
        for _ in 0..(SESSION_BUFFER + 10) {
            hub.route(&data_frame("r1"));
        }

        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, SESSION_BUFFER);
    }
}
