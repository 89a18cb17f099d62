//! Device — a peripheral as seen through the transport layer.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// A peripheral device addressable over the radio transport.
///
/// Identity is the transport id alone; the name is advertisement
/// metadata and may be absent. Nothing here survives the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque transport identifier, unique within the session.
    pub id: DeviceId,
    /// Advertised display name, when the peripheral broadcasts one.
    pub name: Option<String>,
}

impl Device {
    /// Create a device from its transport id, without a name.
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Attach an advertised display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display label: the advertised name, falling back to the id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}
