//! BLE adapter configuration.

use serde::Deserialize;
use uuid::Uuid;

/// Heart Rate service (`0x180D`) on the Bluetooth base UUID.
pub(crate) const HEART_RATE_SERVICE: Uuid = Uuid::from_u128(0x0000_180D_0000_1000_8000_0080_5F9B_34FB);

/// Heart Rate Measurement characteristic (`0x2A37`) on the Bluetooth
/// base UUID.
pub(crate) const HEART_RATE_MEASUREMENT: Uuid =
    Uuid::from_u128(0x0000_2A37_0000_1000_8000_0080_5F9B_34FB);

/// Configuration for the BLE scanner and transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// GATT service the scanner advertises interest in. Defaults to the
    /// Heart Rate service.
    pub service: Uuid,
    /// Unit attached to decoded heart-rate values.
    pub unit: String,
    /// Optional peripheral name allowlist (e.g. `["Polar H10"]`).
    ///
    /// When empty, every peripheral advertising the service is reported.
    pub name_filter: Vec<String>,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            service: HEART_RATE_SERVICE,
            unit: "bpm".to_owned(),
            name_filter: Vec::new(),
        }
    }
}

impl BleConfig {
    /// Check whether an advertised name passes the allowlist.
    #[must_use]
    pub fn passes_filter(&self, name: Option<&str>) -> bool {
        if self.name_filter.is_empty() {
            return true;
        }
        name.is_some_and(|name| {
            self.name_filter
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_heart_rate_service() {
        let config = BleConfig::default();
        assert_eq!(
            config.service.to_string(),
            "0000180d-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(config.unit, "bpm");
    }

    #[test]
    fn should_deserialize_from_toml_with_defaults() {
        let config: BleConfig = toml::from_str("unit = \"beats\"").unwrap();
        assert_eq!(config.unit, "beats");
        assert_eq!(config.service, HEART_RATE_SERVICE);
        assert!(config.name_filter.is_empty());
    }

    #[test]
    fn should_accept_all_names_when_filter_is_empty() {
        let config = BleConfig::default();
        assert!(config.passes_filter(Some("Polar H10")));
        assert!(config.passes_filter(None));
    }

    #[test]
    fn should_match_name_filter_case_insensitively() {
        let config = BleConfig {
            name_filter: vec!["polar h10".to_owned()],
            ..BleConfig::default()
        };
        assert!(config.passes_filter(Some("Polar H10")));
        assert!(!config.passes_filter(Some("Wahoo TICKR")));
        assert!(!config.passes_filter(None));
    }
}
