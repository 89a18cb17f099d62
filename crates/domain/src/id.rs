//! Typed identifier newtypes.
//!
//! [`DeviceId`] wraps the opaque transport identifier handed out by the
//! radio layer (a MAC address on most platforms, an opaque UUID string on
//! others) — it is unique within a session and carries no persisted
//! identity. [`SessionId`] identifies one relay client connection and is
//! generated hub-side.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque transport identifier for a peripheral device.
///
/// The relay and registry treat this as a plain string key; only the
/// transport adapter knows what it actually addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a transport-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for one relay session (one client socket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(uuid::Uuid);

impl Default for SessionId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl SessionId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_session_ids_when_called_twice() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_device_id_through_serde_json() {
        let id = DeviceId::new("AA:BB:CC:DD:EE:FF");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"AA:BB:CC:DD:EE:FF\"");
        let parsed: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_display_device_id_as_raw_string() {
        let id = DeviceId::new("hrm-01");
        assert_eq!(id.to_string(), "hrm-01");
        assert_eq!(id.as_str(), "hrm-01");
    }
}
