//! Scanner port — peripheral discovery.

use std::future::Future;

use tokio::sync::mpsc;

use pulselink_domain::device::Device;
use pulselink_domain::error::TransportError;

/// Discovers peripherals and reports them on a channel.
///
/// The underlying discovery facility is shared: implementations are only
/// required to support one scan at a time. [`crate::scan::ScanService`]
/// enforces that discipline for callers.
pub trait DeviceScanner: Send + Sync {
    /// Start scanning; discovered devices are sent on `found` until the
    /// scan is stopped. Re-advertisements may be reported more than once.
    fn start(
        &self,
        found: mpsc::Sender<Device>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Stop the active scan, if any.
    fn stop(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl<T: DeviceScanner + Send + Sync> DeviceScanner for std::sync::Arc<T> {
    fn start(
        &self,
        found: mpsc::Sender<Device>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).start(found)
    }

    fn stop(&self) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).stop()
    }
}
