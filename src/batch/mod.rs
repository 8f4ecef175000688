//! The chunk-oriented batch engine.
//!
//! A job runs one step; a step drives the read → transform → accumulate
//! → flush loop over a paginated source until exhaustion, writing
//! snapshots in atomic chunks.

pub mod job;
pub mod source;
pub mod step;
pub mod transform;
pub mod writer;

pub use job::{ExitStatus, JobOutcome, JobParameters, JobRunner, DEFAULT_CHUNK_SIZE};
pub use source::{SqliteStoreSource, StoreSource};
pub use step::{SkipPolicy, StepConfig, StepOrchestrator, StepState, StepSummary, StopToken};
pub use transform::{HistoryTransformer, Transform};
pub use writer::{ChunkWriter, SnapshotSink, SqliteHistorySink};
