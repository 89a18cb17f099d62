//! # pulselink-adapter-ble
//!
//! BLE implementation of the transport ports.
//!
//! [`BleScanner`] discovers advertising peripherals and reports them on
//! the scanner port. [`BleTransport`] establishes GATT links and exposes
//! them as [`PeripheralLink`]s: a capability group is a GATT service, an
//! endpoint is a characteristic, and a subscription is a notification
//! stream pumped into the latest-value-wins mailbox.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `pulselink-app` and
//! `pulselink-domain`, never the other way around.
//!
//! [`PeripheralLink`]: pulselink_app::ports::PeripheralLink

mod config;
pub mod decode;
mod error;
mod scanner;
mod transport;

pub use config::BleConfig;
pub use error::BleError;
pub use scanner::BleScanner;
pub use transport::{BleLink, BleTransport};
