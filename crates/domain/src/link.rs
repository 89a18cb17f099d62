//! Link status — the vocabulary of the per-device connection machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of one device link.
///
/// No status is permanently terminal except `Disconnected` reached via
/// an explicit user disconnect, which suppresses further reconnection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// No link; also the initial state.
    #[default]
    Disconnected,
    /// Link establishment and capability discovery in progress.
    Connecting,
    /// Link up, data subscription live.
    Connected,
    /// Reconnect timer fired; about to re-enter `Connecting`.
    Reconnecting,
    /// Data subscription failed after connecting; held until an external
    /// trigger (peer loss or explicit disconnect).
    Error,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Error => "error",
        };
        f.write_str(text)
    }
}

/// Observable state of one device link: status plus optional error text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkState {
    /// Current lifecycle status.
    pub status: LinkStatus,
    /// Human-readable description of the most recent failure, if any.
    pub last_error: Option<String>,
}

impl LinkState {
    /// A state with no error text.
    #[must_use]
    pub fn healthy(status: LinkStatus) -> Self {
        Self {
            status,
            last_error: None,
        }
    }

    /// A state carrying failure text.
    pub fn failed(status: LinkStatus, error: impl Into<String>) -> Self {
        Self {
            status,
            last_error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_disconnected_by_default() {
        assert_eq!(LinkState::default().status, LinkStatus::Disconnected);
        assert!(LinkState::default().last_error.is_none());
    }

    #[test]
    fn should_serialize_status_as_snake_case() {
        let json = serde_json::to_string(&LinkStatus::Reconnecting).unwrap();
        assert_eq!(json, "\"reconnecting\"");
    }

    #[test]
    fn should_carry_error_text_when_failed() {
        let state = LinkState::failed(LinkStatus::Error, "endpoint rejected notifications");
        assert_eq!(state.status, LinkStatus::Error);
        assert_eq!(
            state.last_error.as_deref(),
            Some("endpoint rejected notifications")
        );
    }
}
