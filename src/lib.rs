//! Storebatch - chunked snapshot backup of store aggregates.
//!
//! This crate periodically scans store aggregates whose address starts
//! with a given prefix and persists an immutable [`StoreHistory`]
//! snapshot of each (products and employees included) as an append-only
//! audit trail. Matching data can exceed what fits in memory or in one
//! transaction, so the engine processes records in bounded chunks:
//! every chunk is written atomically, and committed chunks survive a
//! later failure.
//!
//! # Architecture
//!
//! The engine is composed from three seams injected into a step:
//!
//! - [`batch::StoreSource`] - ordered, duplicate-free pages of fully
//!   materialized aggregates under a prefix filter
//! - [`batch::Transform`] - pure aggregate-to-snapshot mapping
//! - [`batch::SnapshotSink`] - atomic chunk persistence
//!
//! [`batch::StepOrchestrator`] drives the read-transform-write loop as
//! an explicit state machine; [`batch::JobRunner`] runs exactly one
//! step per invocation and reports an exit status with counters.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Store aggregates and history snapshots
//! - [`error`] - Error taxonomy (read / transform / write)
//! - [`db`] - Diesel pool, schema, and embedded migrations
//! - [`batch`] - The chunk-oriented engine
//! - [`cli`] - Command-line surface
//!
//! # Known limitations
//!
//! The read cursor is not persisted: a crash mid-run requires a full
//! rerun, and re-running a completed job creates duplicate snapshots.
//!
//! # Example
//!
//! ```no_run
//! use storebatch::batch::{
//!     HistoryTransformer, JobParameters, JobRunner, SqliteHistorySink, SqliteStoreSource,
//! };
//! use storebatch::db;
//!
//! let pool = db::create_pool("storebatch.db", 5).unwrap();
//! let params = JobParameters::new("Seoul").with_chunk_size(500);
//! let source = SqliteStoreSource::new(pool.clone(), &params.address, params.chunk_size);
//! let runner = JobRunner::new(
//!     params,
//!     source,
//!     HistoryTransformer::new(),
//!     SqliteHistorySink::new(pool),
//! );
//! let outcome = runner.run();
//! assert!(outcome.is_success());
//! ```
//!
//! [`StoreHistory`]: domain::StoreHistory

pub mod batch;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
