//! Step orchestration: the read → transform → accumulate → flush loop,
//! driven as an explicit state machine.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::batch::source::StoreSource;
use crate::batch::transform::Transform;
use crate::batch::writer::{ChunkWriter, SnapshotSink};
use crate::domain::Store;
use crate::error::StepError;

/// Cooperative stop signal, observed only at chunk boundaries. The
/// in-flight chunk always commits or rolls back before the step halts.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to do when a single item fails to transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPolicy {
    /// First transform failure fails the step.
    FailFast,
    /// Skip failing items, up to `limit` of them, then fail the step.
    Skip { limit: u32 },
}

/// Tuning for one step execution.
#[derive(Debug, Clone, Copy)]
pub struct StepConfig {
    /// Snapshots per atomic persist.
    pub chunk_size: usize,
    /// Persist attempts per chunk before escalating.
    pub write_attempts: u32,
    /// Transform failure handling.
    pub skip_policy: SkipPolicy,
}

impl StepConfig {
    fn validate(&self) -> Result<(), StepError> {
        if self.chunk_size == 0 {
            return Err(StepError::InvalidParameters(
                "chunk size must be positive".into(),
            ));
        }
        if self.write_attempts == 0 {
            return Err(StepError::InvalidParameters(
                "write attempts must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// States of the step control loop. Transitions:
///
/// ```text
/// Initializing -> Reading -> Processing -> Writing -> Reading ...
///                        \-> Completed        \-> Completed
/// any non-terminal state -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepState {
    Initializing,
    Reading,
    Processing,
    Writing,
    Completed,
    Failed,
}

impl StepState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Counters reported for every step, successful or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub items_read: u64,
    pub items_written: u64,
    pub items_skipped: u64,
    pub chunks_committed: u64,
    /// True when the step ended early because a stop was requested.
    pub stopped_early: bool,
}

/// A failed step still reports how far it got.
#[derive(Debug)]
pub struct StepFailure {
    pub error: StepError,
    pub summary: StepSummary,
}

/// Drives one read-transform-write loop to a terminal state.
///
/// Collaborators are injected fully constructed; the orchestrator owns
/// chunk boundaries, skip accounting, and failure handling.
pub struct StepOrchestrator<R: StoreSource, T: Transform, S: SnapshotSink> {
    source: R,
    transformer: T,
    writer: ChunkWriter<S>,
    config: StepConfig,
    stop: StopToken,
    state: StepState,
    page: VecDeque<Store>,
    source_done: bool,
    stopped: bool,
    items_read: u64,
    items_skipped: u64,
    failure: Option<StepError>,
}

impl<R: StoreSource, T: Transform, S: SnapshotSink> StepOrchestrator<R, T, S> {
    pub fn new(source: R, transformer: T, sink: S, config: StepConfig, stop: StopToken) -> Self {
        let writer = ChunkWriter::new(sink, config.chunk_size.max(1), config.write_attempts.max(1));
        Self {
            source,
            transformer,
            writer,
            config,
            stop,
            state: StepState::Initializing,
            page: VecDeque::new(),
            source_done: false,
            stopped: false,
            items_read: 0,
            items_skipped: 0,
            failure: None,
        }
    }

    /// Current state, exposed for tests and progress reporting.
    #[must_use]
    pub fn state(&self) -> StepState {
        self.state
    }

    /// Run to a terminal state.
    pub fn run(mut self) -> Result<StepSummary, StepFailure> {
        while !self.state.is_terminal() {
            self.advance();
        }

        let summary = self.summary();
        match self.failure {
            None => Ok(summary),
            Some(error) => Err(StepFailure { error, summary }),
        }
    }

    /// Execute the work of the current state and transition once.
    fn advance(&mut self) {
        self.state = match self.state {
            StepState::Initializing => self.initialize(),
            StepState::Reading => self.read(),
            StepState::Processing => self.process(),
            StepState::Writing => self.write(),
            terminal => terminal,
        };
        debug!(state = ?self.state, "step transition");
    }

    fn initialize(&mut self) -> StepState {
        match self.config.validate() {
            Ok(()) => StepState::Reading,
            Err(e) => self.fail(e),
        }
    }

    fn read(&mut self) -> StepState {
        if self.stop.is_requested() {
            info!("stop requested, halting at chunk boundary");
            self.stopped = true;
            // Flush whatever is accumulated so transformed items are not lost.
            return if self.writer.pending() > 0 {
                StepState::Writing
            } else {
                StepState::Completed
            };
        }

        match self.source.next_page() {
            Ok(page) if page.is_empty() => {
                self.source_done = true;
                if self.writer.pending() > 0 {
                    StepState::Writing
                } else {
                    StepState::Completed
                }
            }
            Ok(page) => {
                self.items_read += page.len() as u64;
                self.page = page.into();
                StepState::Processing
            }
            Err(e) => self.fail(e.into()),
        }
    }

    fn process(&mut self) -> StepState {
        while let Some(store) = self.page.pop_front() {
            match self.transformer.transform(&store) {
                Ok(snapshot) => {
                    self.writer.push(snapshot);
                    if self.writer.is_full() {
                        return StepState::Writing;
                    }
                }
                Err(e) => match self.config.skip_policy {
                    SkipPolicy::FailFast => return self.fail(e.into()),
                    SkipPolicy::Skip { limit } => {
                        if self.items_skipped >= u64::from(limit) {
                            return self.fail(StepError::SkipLimitExceeded { limit, source: e });
                        }
                        self.items_skipped += 1;
                        warn!(store_id = store.id, skipped = self.items_skipped, error = %e, "item skipped");
                    }
                },
            }
        }
        StepState::Reading
    }

    fn write(&mut self) -> StepState {
        match self.writer.flush() {
            Ok(()) => {
                if !self.page.is_empty() {
                    StepState::Processing
                } else if self.source_done || self.stopped {
                    StepState::Completed
                } else {
                    StepState::Reading
                }
            }
            Err(e) => self.fail(StepError::WriteExhausted {
                attempts: self.config.write_attempts,
                source: e,
            }),
        }
    }

    fn fail(&mut self, error: StepError) -> StepState {
        warn!(kind = error.kind(), error = %error, "step failed");
        self.failure = Some(error);
        StepState::Failed
    }

    fn summary(&self) -> StepSummary {
        StepSummary {
            items_read: self.items_read,
            items_written: self.writer.items_written(),
            items_skipped: self.items_skipped,
            chunks_committed: self.writer.chunks_committed(),
            stopped_early: self.stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::transform::HistoryTransformer;
    use crate::error::{ReadError, TransformError, WriteError};
    use crate::testkit::batch::{FailOn, FlakySink, RecordingSink, ScriptedSource};
    use crate::testkit::domain::stores_page;

    fn config(chunk_size: usize) -> StepConfig {
        StepConfig {
            chunk_size,
            write_attempts: 1,
            skip_policy: SkipPolicy::FailFast,
        }
    }

    fn run_step<S: SnapshotSink>(
        source: ScriptedSource,
        sink: S,
        config: StepConfig,
    ) -> Result<StepSummary, StepFailure> {
        StepOrchestrator::new(
            source,
            HistoryTransformer::new(),
            sink,
            config,
            StopToken::new(),
        )
        .run()
    }

    #[test]
    fn zero_chunk_size_fails_in_initializing() {
        let result = run_step(ScriptedSource::default(), RecordingSink::new(), config(0));
        let failure = result.unwrap_err();
        assert!(matches!(failure.error, StepError::InvalidParameters(_)));
        assert_eq!(failure.summary, StepSummary::default());
    }

    #[test]
    fn empty_source_completes_with_no_chunks() {
        let summary = run_step(ScriptedSource::default(), RecordingSink::new(), config(10)).unwrap();
        assert_eq!(summary.items_read, 0);
        assert_eq!(summary.chunks_committed, 0);
    }

    #[test]
    fn chunks_flush_at_capacity_and_remainder_at_end() {
        // 5 items, chunk size 2: chunks of 2, 2, 1.
        let source = ScriptedSource::with_pages(vec![stores_page(0..3), stores_page(3..5)]);
        let sink = RecordingSink::new();
        let chunks = sink.chunks();

        let summary = run_step(source, sink, config(2)).unwrap();

        assert_eq!(summary.items_read, 5);
        assert_eq!(summary.items_written, 5);
        assert_eq!(summary.chunks_committed, 3);
        let sizes: Vec<usize> = chunks.lock().unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn item_order_is_preserved_from_read_to_write() {
        let source = ScriptedSource::with_pages(vec![stores_page(0..4)]);
        let sink = RecordingSink::new();
        let chunks = sink.chunks();

        run_step(source, sink, config(3)).unwrap();

        let ids: Vec<i64> = chunks
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|h| h.store_id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn read_error_is_fatal_with_committed_chunks_kept() {
        let source = ScriptedSource::with_results(vec![
            Ok(stores_page(0..2)),
            Err(ReadError::Query("connection reset".into())),
        ]);
        let sink = RecordingSink::new();
        let chunks = sink.chunks();

        let failure = run_step(source, sink, config(2)).unwrap_err();

        assert!(matches!(failure.error, StepError::Read(_)));
        assert_eq!(failure.summary.chunks_committed, 1);
        assert_eq!(chunks.lock().unwrap().len(), 1);
    }

    #[test]
    fn fail_fast_policy_stops_on_first_transform_error() {
        let source = ScriptedSource::with_pages(vec![stores_page(0..3)]);
        let transformer = FailOn::ids([1]);
        let failure = StepOrchestrator::new(
            source,
            transformer,
            RecordingSink::new(),
            config(10),
            StopToken::new(),
        )
        .run()
        .unwrap_err();

        assert!(matches!(failure.error, StepError::Transform(_)));
        assert_eq!(failure.summary.items_written, 0);
    }

    #[test]
    fn skip_policy_counts_skips_and_continues() {
        let source = ScriptedSource::with_pages(vec![stores_page(0..5)]);
        let sink = RecordingSink::new();
        let chunks = sink.chunks();
        let summary = StepOrchestrator::new(
            source,
            FailOn::ids([1, 3]),
            sink,
            StepConfig {
                chunk_size: 10,
                write_attempts: 1,
                skip_policy: SkipPolicy::Skip { limit: 2 },
            },
            StopToken::new(),
        )
        .run()
        .unwrap();

        assert_eq!(summary.items_read, 5);
        assert_eq!(summary.items_skipped, 2);
        assert_eq!(summary.items_written, 3);
        let ids: Vec<i64> = chunks
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|h| h.store_id)
            .collect();
        assert_eq!(ids, vec![0, 2, 4]);
    }

    #[test]
    fn exceeding_the_skip_limit_fails_the_step() {
        let source = ScriptedSource::with_pages(vec![stores_page(0..5)]);
        let failure = StepOrchestrator::new(
            source,
            FailOn::ids([0, 1, 2]),
            RecordingSink::new(),
            StepConfig {
                chunk_size: 10,
                write_attempts: 1,
                skip_policy: SkipPolicy::Skip { limit: 2 },
            },
            StopToken::new(),
        )
        .run()
        .unwrap_err();

        assert!(matches!(
            failure.error,
            StepError::SkipLimitExceeded { limit: 2, .. }
        ));
        assert_eq!(failure.summary.items_skipped, 2);
    }

    #[test]
    fn write_failure_escalates_after_retries_without_partial_chunks() {
        // First chunk commits, second chunk always fails.
        let source = ScriptedSource::with_pages(vec![stores_page(0..4)]);
        let sink = FlakySink::failing_from_chunk(2);
        let committed = sink.committed();

        let failure = run_step(
            source,
            sink,
            StepConfig {
                chunk_size: 2,
                write_attempts: 3,
                skip_policy: SkipPolicy::FailFast,
            },
        )
        .unwrap_err();

        assert!(matches!(
            failure.error,
            StepError::WriteExhausted {
                attempts: 3,
                source: WriteError::Database(_),
            }
        ));
        assert_eq!(failure.summary.chunks_committed, 1);
        assert_eq!(failure.summary.items_written, 2);
        assert_eq!(committed.lock().unwrap().len(), 1);
    }

    #[test]
    fn stop_token_halts_at_chunk_boundary_and_flushes_remainder() {
        struct StopAfterFirstPage {
            inner: ScriptedSource,
            stop: StopToken,
        }
        impl StoreSource for StopAfterFirstPage {
            fn next_page(&mut self) -> Result<Vec<crate::domain::Store>, ReadError> {
                let page = self.inner.next_page()?;
                self.stop.request();
                Ok(page)
            }
        }

        let stop = StopToken::new();
        let source = StopAfterFirstPage {
            inner: ScriptedSource::with_pages(vec![stores_page(0..3), stores_page(3..6)]),
            stop: stop.clone(),
        };
        let sink = RecordingSink::new();
        let chunks = sink.chunks();

        let summary = StepOrchestrator::new(
            source,
            HistoryTransformer::new(),
            sink,
            config(10),
            stop,
        )
        .run()
        .unwrap();

        // Only the first page was read; its remainder was flushed before halting.
        assert_eq!(summary.items_read, 3);
        assert_eq!(summary.items_written, 3);
        assert!(summary.stopped_early);
        assert_eq!(chunks.lock().unwrap().len(), 1);
    }

    #[test]
    fn state_machine_reaches_completed_through_expected_states() {
        let source = ScriptedSource::with_pages(vec![stores_page(0..2)]);
        let mut step = StepOrchestrator::new(
            source,
            HistoryTransformer::new(),
            RecordingSink::new(),
            config(2),
            StopToken::new(),
        );

        assert_eq!(step.state(), StepState::Initializing);
        let mut visited = vec![step.state()];
        while !step.state().is_terminal() {
            step.advance();
            visited.push(step.state());
        }

        assert_eq!(
            visited,
            vec![
                StepState::Initializing,
                StepState::Reading,
                StepState::Processing,
                StepState::Writing,
                StepState::Reading,
                StepState::Completed,
            ]
        );

        // transform failure propagation path
        let failing = StepOrchestrator::new(
            ScriptedSource::with_pages(vec![stores_page(0..1)]),
            FailOn::ids([0]),
            RecordingSink::new(),
            config(2),
            StopToken::new(),
        );
        let failure = failing.run().unwrap_err();
        assert!(matches!(
            failure.error,
            StepError::Transform(TransformError::Materialize { .. })
        ));
    }
}
