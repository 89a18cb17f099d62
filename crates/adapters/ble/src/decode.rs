//! Notification payload decoding.
//!
//! The Heart Rate Measurement characteristic carries a flags byte
//! followed by the value: bit 0 of the flags selects an 8-bit or a
//! little-endian 16-bit reading. Other endpoints fall back to a single
//! raw byte with no unit claimed.

use uuid::Uuid;

use pulselink_domain::measurement::{Measurement, UNKNOWN_UNIT};

use crate::config::HEART_RATE_MEASUREMENT;

/// Heart-rate flags bit 0: value is `u16` little-endian when set.
const FLAG_VALUE_U16: u8 = 0b0000_0001;

/// Decode a notification payload for the given endpoint.
///
/// Returns `None` for payloads too short to carry a value; the caller
/// drops those rather than forwarding garbage.
#[must_use]
pub fn decode(endpoint: Uuid, payload: &[u8], unit: &str) -> Option<Measurement> {
    if endpoint == HEART_RATE_MEASUREMENT {
        decode_heart_rate(payload, unit)
    } else {
        decode_raw(payload)
    }
}

fn decode_heart_rate(payload: &[u8], unit: &str) -> Option<Measurement> {
    let flags = *payload.first()?;
    let value = if flags & FLAG_VALUE_U16 != 0 {
        let bytes: [u8; 2] = payload.get(1..3)?.try_into().ok()?;
        f64::from(u16::from_le_bytes(bytes))
    } else {
        f64::from(*payload.get(1)?)
    };
    Some(Measurement::new(value, unit))
}

fn decode_raw(payload: &[u8]) -> Option<Measurement> {
    payload
        .first()
        .map(|byte| Measurement::unitless(f64::from(*byte)))
}
