//! Job orchestration: one parameterized step execution with a reported
//! exit status.

use serde::Serialize;
use tracing::{error, info};

use crate::batch::source::StoreSource;
use crate::batch::step::{SkipPolicy, StepConfig, StepOrchestrator, StepSummary, StopToken};
use crate::batch::transform::Transform;
use crate::batch::writer::SnapshotSink;
use crate::error::StepError;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Run parameters supplied by the invoker.
#[derive(Debug, Clone, Serialize)]
pub struct JobParameters {
    /// Address prefix filter; required, matched as a prefix.
    pub address: String,
    /// Snapshots per atomic persist.
    pub chunk_size: usize,
}

impl JobParameters {
    /// Parameters for `address` with the default chunk size of 1000.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    fn validate(&self) -> Result<(), StepError> {
        if self.address.is_empty() {
            return Err(StepError::InvalidParameters(
                "address filter must not be empty".into(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(StepError::InvalidParameters(
                "chunk size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Job-level exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitStatus {
    Success,
    Failed,
}

/// Result of one job run: exit status, counters, and the failing error
/// kind when the step did not complete.
#[derive(Debug, Serialize)]
pub struct JobOutcome {
    pub status: ExitStatus,
    pub summary: StepSummary,
    pub error_kind: Option<&'static str>,
    #[serde(skip)]
    pub error: Option<StepError>,
}

impl JobOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ExitStatus::Success
    }
}

/// Executes a single step with explicitly injected collaborators.
///
/// No internal parallelism: one job runs one step, sequentially.
pub struct JobRunner<R: StoreSource, T: Transform, S: SnapshotSink> {
    params: JobParameters,
    source: R,
    transformer: T,
    sink: S,
    skip_policy: SkipPolicy,
    write_attempts: u32,
    stop: StopToken,
}

impl<R: StoreSource, T: Transform, S: SnapshotSink> JobRunner<R, T, S> {
    pub fn new(params: JobParameters, source: R, transformer: T, sink: S) -> Self {
        Self {
            params,
            source,
            transformer,
            sink,
            skip_policy: SkipPolicy::FailFast,
            write_attempts: 1,
            stop: StopToken::new(),
        }
    }

    #[must_use]
    pub fn with_skip_policy(mut self, policy: SkipPolicy) -> Self {
        self.skip_policy = policy;
        self
    }

    #[must_use]
    pub fn with_write_attempts(mut self, attempts: u32) -> Self {
        self.write_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_stop_token(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    /// Run the step to a terminal state and report the outcome.
    pub fn run(self) -> JobOutcome {
        info!(
            address = %self.params.address,
            chunk_size = self.params.chunk_size,
            "job starting"
        );

        if let Err(e) = self.params.validate() {
            error!(error = %e, "invalid job parameters");
            return JobOutcome {
                status: ExitStatus::Failed,
                summary: StepSummary::default(),
                error_kind: Some(e.kind()),
                error: Some(e),
            };
        }

        let step = StepOrchestrator::new(
            self.source,
            self.transformer,
            self.sink,
            StepConfig {
                chunk_size: self.params.chunk_size,
                write_attempts: self.write_attempts,
                skip_policy: self.skip_policy,
            },
            self.stop,
        );

        match step.run() {
            Ok(summary) => {
                info!(
                    items_written = summary.items_written,
                    items_skipped = summary.items_skipped,
                    chunks_committed = summary.chunks_committed,
                    stopped_early = summary.stopped_early,
                    "job completed"
                );
                JobOutcome {
                    status: ExitStatus::Success,
                    summary,
                    error_kind: None,
                    error: None,
                }
            }
            Err(failure) => {
                error!(
                    kind = failure.error.kind(),
                    error = %failure.error,
                    items_written = failure.summary.items_written,
                    chunks_committed = failure.summary.chunks_committed,
                    "job failed"
                );
                JobOutcome {
                    status: ExitStatus::Failed,
                    summary: failure.summary,
                    error_kind: Some(failure.error.kind()),
                    error: Some(failure.error),
                }
            }
        }
    }
}
