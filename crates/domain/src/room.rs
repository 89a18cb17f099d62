//! Room — a relay-side broadcast group identified by a caller-supplied name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a relay broadcast group.
///
/// Rooms exist only as hub membership state scoped to socket lifetime;
/// there is nothing to create or delete. An empty name is never routable
/// — the hub rejects it at the door.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Wrap a caller-supplied room name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// View the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty (and therefore unroutable).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RoomName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
