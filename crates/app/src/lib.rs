//! # pulselink-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound
//!   ports): [`ports::LinkTransport`] / [`ports::PeripheralLink`] for the
//!   radio, [`ports::DeviceScanner`] for discovery, [`ports::EventSink`]
//!   for the relay boundary
//! - Supervise one device link per [`connection::DeviceConnection`]:
//!   lifecycle state machine, fixed-delay reconnection, bounded-1 data
//!   delivery, idempotent teardown
//! - Enforce the single-active-scan discipline ([`scan::ScanService`])
//! - Fold relay events into per-device projections
//!   ([`registry::DeviceRegistry`])
//!
//! ## Dependency rule
//! Depends on `pulselink-domain` only (plus `tokio::sync` for channels
//! and `tokio-util` for cancellation). Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

pub mod connection;
pub mod ports;
pub mod registry;
pub mod scan;
