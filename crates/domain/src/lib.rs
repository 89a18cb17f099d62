//! # pulselink-domain
//!
//! Pure domain model for the pulselink telemetry relay.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, error conventions, timestamps
//! - Define **Devices** (peripherals identified by an opaque transport id)
//! - Define **Device events** (connected / data / disconnected)
//! - Define the **wire protocol** spoken between clients and the relay hub
//! - Define **Projections** (the observer-side per-device read model and
//!   its fold rules)
//! - Define the **link status** vocabulary of the connection state machine
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO
//! crates. All IO boundaries are expressed as traits in the `app` crate
//! (ports).

pub mod capability;
pub mod device;
pub mod error;
pub mod event;
pub mod id;
pub mod link;
pub mod measurement;
pub mod message;
pub mod projection;
pub mod room;
pub mod time;
