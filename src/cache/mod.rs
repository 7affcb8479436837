//! In-memory snapshot of the group state and the authorization gate.
//!
//! The snapshot is read without I/O; every write goes through the store and
//! replaces the snapshot with the value the store committed.

mod auth;
mod snapshot;

pub use auth::AuthGate;
pub use snapshot::Cache;
