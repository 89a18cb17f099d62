//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `bridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;
use url::Url;

use pulselink_adapter_ble::BleConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relay connection settings.
    pub relay: RelayConfig,
    /// BLE scanner/transport settings.
    pub ble: BleConfig,
    /// Discovery settings.
    pub scan: ScanConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Relay connection configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// WebSocket URL of the relay hub.
    pub url: String,
    /// Room to join; all emitted events carry this tag.
    pub room: String,
}

/// Discovery configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// How long to wait for the first matching peripheral, in seconds.
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `bridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("bridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PULSELINK_RELAY_URL") {
            self.relay.url = val;
        }
        if let Ok(val) = std::env::var("PULSELINK_ROOM") {
            self.relay.room = val;
        }
        if let Ok(val) = std::env::var("PULSELINK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.relay.url)
            .map_err(|err| ConfigError::Validation(format!("relay url: {err}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::Validation(format!(
                "relay url scheme must be ws or wss, got {}",
                url.scheme()
            )));
        }
        if self.relay.room.is_empty() {
            return Err(ConfigError::Validation("room must not be empty".to_string()));
        }
        if self.scan.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "scan timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed relay URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured URL does not parse; `load`
    /// already validates it, so this only fails for hand-built configs.
    pub fn relay_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.relay.url)
            .map_err(|err| ConfigError::Validation(format!("relay url: {err}")))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:4100/ws".to_string(),
            room: "shared-room".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pulselink=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.relay.url, "ws://127.0.0.1:4100/ws");
        assert_eq!(config.relay.room, "shared-room");
        assert_eq!(config.scan.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [relay]
            url = 'ws://relay.local:4100/ws'
            room = 'ward-3'

            [ble]
            unit = 'bpm'
            name_filter = ['Polar H10']

            [scan]
            timeout_secs = 10

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.relay.url, "ws://relay.local:4100/ws");
        assert_eq!(config.relay.room, "ward-3");
        assert_eq!(config.ble.name_filter, vec!["Polar H10"]);
        assert_eq!(config.scan.timeout_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_non_websocket_url() {
        let mut config = Config::default();
        config.relay.url = "http://127.0.0.1:4100".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_unparsable_url() {
        let mut config = Config::default();
        config.relay.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_room() {
        let mut config = Config::default();
        config.relay.room = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_scan_timeout() {
        let mut config = Config::default();
        config.scan.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.relay.room, "shared-room");
    }
}
