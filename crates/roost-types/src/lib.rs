//! Shared types for the Roost friend subsystem: API models, notification
//! event payloads, and the error taxonomy. Canonical definitions live here
//! so roost-db, roost-presence, and roost-friends agree on shapes.

pub mod error;
pub mod events;
pub mod models;

pub use error::RelationError;
