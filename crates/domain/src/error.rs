//! Error taxonomy shared across the workspace.
//!
//! Each failure class maps to one branch of the connection state machine:
//! [`TransportError`] drives the indefinite reconnect loop,
//! [`SubscriptionError`] parks the device in the `Error` status, and
//! [`RelayError`] is logged at the relay boundary without disturbing the
//! machine. Adapters define their own typed errors and convert into these
//! at the port boundary.

/// Failure while establishing or operating the radio link.
///
/// Non-fatal by design: every variant feeds the fixed-delay reconnect
/// loop rather than terminating the connection supervisor.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Platform permission for radio access was not granted.
    #[error("radio permission not granted")]
    PermissionDenied,

    /// Device scan could not be started or aborted mid-flight.
    #[error("scan failed: {0}")]
    Scan(String),

    /// Link establishment to the peripheral failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Capability discovery on an established link failed.
    #[error("capability discovery failed: {0}")]
    Discovery(String),

    /// The peripheral exposes no capability groups at all.
    #[error("peripheral exposes no capability groups")]
    NoCapabilities,
}

/// Failure of the data subscription after the link was established.
///
/// Moves the device to the `Error` status; the machine does not retry
/// on its own from there within the same connect cycle.
#[derive(Debug, Clone, thiserror::Error)]
#[error("subscription failed: {reason}")]
pub struct SubscriptionError {
    /// Human-readable description, surfaced as the device's last error.
    pub reason: String,
}

impl SubscriptionError {
    /// Build from any displayable cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure at the relay boundary (encoding or delivering an event).
///
/// Never escalated: emitters log it and carry on.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The relay session is gone; nothing more can be delivered.
    #[error("relay session closed")]
    Closed,

    /// A message could not be encoded for the wire.
    #[error("failed to encode relay message")]
    Encode(#[from] serde_json::Error),

    /// The underlying socket transport failed.
    #[error("relay transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_transport_error_with_cause() {
        let err = TransportError::Connect("device unreachable".into());
        assert_eq!(err.to_string(), "connect failed: device unreachable");
    }

    #[test]
    fn should_display_no_capabilities_error() {
        let err = TransportError::NoCapabilities;
        assert_eq!(err.to_string(), "peripheral exposes no capability groups");
    }

    #[test]
    fn should_display_subscription_error_reason() {
        let err = SubscriptionError::new("endpoint rejected notifications");
        assert_eq!(
            err.to_string(),
            "subscription failed: endpoint rejected notifications"
        );
    }

    #[test]
    fn should_convert_serde_failure_into_relay_error() {
        let bad = serde_json::from_str::<serde_json::Value>("{");
        let err: RelayError = bad.unwrap_err().into();
        assert!(matches!(err, RelayError::Encode(_)));
    }
}
