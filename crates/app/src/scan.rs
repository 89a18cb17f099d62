//! Scan service — single-active-scan discipline over the scanner port.
//!
//! All device connections share one underlying discovery facility, and
//! only one scan may be active at a time. Starting a new scan first stops
//! any prior one, so results are never delivered twice.

use tokio::sync::{Mutex, mpsc};

use pulselink_domain::device::Device;
use pulselink_domain::error::TransportError;

use crate::ports::DeviceScanner;

/// Serializes scan start/stop over a shared discovery facility.
pub struct ScanService<S> {
    scanner: S,
    active: Mutex<bool>,
}

impl<S: DeviceScanner> ScanService<S> {
    /// Wrap a scanner implementation.
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            active: Mutex::new(false),
        }
    }

    /// Start a scan, stopping any prior one first.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the underlying facility refuses to
    /// stop the previous scan or start the new one.
    pub async fn start_scan(&self, found: mpsc::Sender<Device>) -> Result<(), TransportError> {
        let mut active = self.active.lock().await;
        if *active {
            tracing::debug!("stopping prior scan before starting a new one");
            self.scanner.stop().await?;
            *active = false;
        }
        self.scanner.start(found).await?;
        *active = true;
        Ok(())
    }

    /// Stop the active scan, if any. A no-op when nothing is scanning.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the underlying facility fails to
    /// stop.
    pub async fn stop_scan(&self) -> Result<(), TransportError> {
        let mut active = self.active.lock().await;
        if *active {
            self.scanner.stop().await?;
            *active = false;
        }
        Ok(())
    }

    /// Whether a scan is currently active.
    pub async fn is_scanning(&self) -> bool {
        *self.active.lock().await
    }
}
