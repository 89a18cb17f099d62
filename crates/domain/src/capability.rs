//! Capability groups — logical groupings of addressable data endpoints
//! on a peripheral.
//!
//! On BLE this maps to a GATT service and its characteristics, but the
//! domain deliberately knows nothing about the radio: a group is a UUID
//! plus the UUIDs of its endpoints.

use uuid::Uuid;

/// A group of addressable data endpoints discovered on a peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityGroup {
    /// Identifier of the group itself.
    pub id: Uuid,
    /// Addressable data endpoints within the group, in discovery order.
    pub endpoints: Vec<Uuid>,
}

impl CapabilityGroup {
    /// Create a group from its id and endpoints.
    #[must_use]
    pub fn new(id: Uuid, endpoints: Vec<Uuid>) -> Self {
        Self { id, endpoints }
    }

    /// First addressable endpoint, if the group has any.
    #[must_use]
    pub fn first_endpoint(&self) -> Option<Uuid> {
        self.endpoints.first().copied()
    }
}
