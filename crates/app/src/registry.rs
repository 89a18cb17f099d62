//! Device registry — the observer-side read model.
//!
//! Folds the relay's event stream into per-device projections, strictly
//! in arrival order. Purely event-driven: no polling, no timers. An
//! event for an unseen device creates its projection (forgiving merge);
//! projections are never auto-removed.

use std::collections::HashMap;

use pulselink_domain::event::DeviceEvent;
use pulselink_domain::id::DeviceId;
use pulselink_domain::projection::DeviceProjection;

/// Mapping from device id to its continuously updated projection.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceId, DeviceProjection>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the registry, creating the projection on the
    /// first event referencing its id.
    pub fn apply(&mut self, event: &DeviceEvent) -> &DeviceProjection {
        self.devices
            .entry(event.device_id().clone())
            .and_modify(|projection| projection.apply(event))
            .or_insert_with(|| DeviceProjection::first_seen(event))
    }

    /// Look up one device's projection.
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&DeviceProjection> {
        self.devices.get(id)
    }

    /// Number of devices ever seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Snapshot of all projections, ordered by device id for stable
    /// display.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DeviceProjection> {
        let mut all: Vec<_> = self.devices.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}
