//! Measurement — one decoded value from a data endpoint.

/// Unit placeholder used when the decoder cannot name the unit.
pub const UNKNOWN_UNIT: &str = "n/a";

/// A decoded telemetry value with its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Decoded numeric value.
    pub value: f64,
    /// Unit label, e.g. `"bpm"`; [`UNKNOWN_UNIT`] when unknown.
    pub unit: String,
}

impl Measurement {
    /// Create a measurement with a known unit.
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Create a measurement whose unit the decoder could not determine.
    #[must_use]
    pub fn unitless(value: f64) -> Self {
        Self::new(value, UNKNOWN_UNIT)
    }
}
