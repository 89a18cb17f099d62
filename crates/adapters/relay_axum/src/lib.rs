//! # pulselink-adapter-relay-axum
//!
//! The relay hub — a stateless transport multiplexer over WebSockets.
//!
//! ## Responsibilities
//! - Track room membership per session (at most one room; last join wins)
//! - Fan inbound device events out to every member of the tagged room,
//!   including the sender — fire-and-forget, at-most-once, no replay
//! - Isolate per-frame handling so one malformed message never ends the
//!   loop for other sessions
//!
//! The hub holds no device state and never mutates payloads; it trusts
//! the room tag for routing with no authorization check. That is
//! acceptable for trusted/demo deployments only — production use needs
//! room-join authorization, which is an open design question here.
//!
//! ## Dependency rule
//! Depends on `pulselink-domain` for the wire protocol. Never leaks axum
//! types into the domain.

pub mod hub;
pub mod router;
pub mod ws;

pub use hub::RelayHub;
