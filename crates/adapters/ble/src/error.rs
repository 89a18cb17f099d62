//! BLE adapter error types and port-boundary conversions.

use pulselink_domain::error::{SubscriptionError, TransportError};

/// Errors specific to the BLE adapter itself.
#[derive(Debug, thiserror::Error)]
pub enum BleError {
    /// No BLE adapter found on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// Underlying BLE stack failure.
    #[error("BLE stack error")]
    Stack(#[from] btleplug::Error),
}

/// Map a scan-phase failure onto the transport port taxonomy.
pub(crate) fn scan_error(err: btleplug::Error) -> TransportError {
    match err {
        btleplug::Error::PermissionDenied => TransportError::PermissionDenied,
        other => TransportError::Scan(other.to_string()),
    }
}

/// Map a connect-phase failure onto the transport port taxonomy.
pub(crate) fn connect_error(err: btleplug::Error) -> TransportError {
    match err {
        btleplug::Error::PermissionDenied => TransportError::PermissionDenied,
        other => TransportError::Connect(other.to_string()),
    }
}

/// Map a service-discovery failure onto the transport port taxonomy.
pub(crate) fn discovery_error(err: btleplug::Error) -> TransportError {
    TransportError::Discovery(err.to_string())
}

/// Map a subscribe failure onto the subscription port taxonomy.
pub(crate) fn subscribe_error(err: &btleplug::Error) -> SubscriptionError {
    SubscriptionError::new(err.to_string())
}
