//! Event sink port — the relay boundary.

use std::future::Future;

use pulselink_domain::error::RelayError;
use pulselink_domain::event::DeviceEvent;

/// Delivers device events toward the relay.
///
/// Fire-and-forget semantics: callers log failures and carry on, so an
/// unreachable relay never disturbs a connection's state machine.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: DeviceEvent) -> impl Future<Output = Result<(), RelayError>> + Send;
}

impl<T: EventSink + Send + Sync> EventSink for std::sync::Arc<T> {
    fn emit(&self, event: DeviceEvent) -> impl Future<Output = Result<(), RelayError>> + Send {
        (**self).emit(event)
    }
}
