//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`batch`] — Scripted [`StoreSource`](crate::batch::StoreSource) /
//!   [`SnapshotSink`](crate::batch::SnapshotSink) fakes: `ScriptedSource`,
//!   `RecordingSink`, `FlakySink`, `FailOn`.
//! - [`domain`] — Builders for store aggregates and snapshots.
//! - [`db`] — Migrated in-memory pools and row seeding helpers.

pub mod batch;
pub mod db;
pub mod domain;
