//! Scripted fakes for the batch engine's seams.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::batch::{SnapshotSink, StoreSource, Transform};
use crate::domain::{Store, StoreHistory};
use crate::error::{ReadError, TransformError, WriteError};

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

/// A source with a pre-loaded queue of page results.
///
/// Each call to `next_page()` pops the next result; an exhausted queue
/// yields empty pages, which the step treats as end-of-source.
#[derive(Default)]
pub struct ScriptedSource {
    pages: VecDeque<Result<Vec<Store>, ReadError>>,
}

impl ScriptedSource {
    #[must_use]
    pub fn with_pages(pages: Vec<Vec<Store>>) -> Self {
        Self {
            pages: pages.into_iter().map(Ok).collect(),
        }
    }

    #[must_use]
    pub fn with_results(results: Vec<Result<Vec<Store>, ReadError>>) -> Self {
        Self {
            pages: results.into(),
        }
    }
}

impl StoreSource for ScriptedSource {
    fn next_page(&mut self) -> Result<Vec<Store>, ReadError> {
        self.pages.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// A sink that records every committed chunk in memory.
#[derive(Default)]
pub struct RecordingSink {
    chunks: Arc<Mutex<Vec<Vec<StoreHistory>>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the committed chunks, for assertions.
    #[must_use]
    pub fn chunks(&self) -> Arc<Mutex<Vec<Vec<StoreHistory>>>> {
        self.chunks.clone()
    }
}

impl SnapshotSink for RecordingSink {
    fn persist(&self, chunk: &[StoreHistory]) -> Result<(), WriteError> {
        self.chunks.lock().unwrap().push(chunk.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FlakySink
// ---------------------------------------------------------------------------

/// A sink with scripted failures: either the first N calls fail, or
/// every call from the Nth successful chunk on fails. Successful chunks
/// are recorded like [`RecordingSink`].
pub struct FlakySink {
    committed: Arc<Mutex<Vec<Vec<StoreHistory>>>>,
    calls: Arc<AtomicU32>,
    fail_first: u32,
    fail_from_chunk: Option<u64>,
}

impl FlakySink {
    /// Fail the first `n` persist calls, then succeed.
    #[must_use]
    pub fn failing_times(n: u32) -> Self {
        Self {
            committed: Arc::default(),
            calls: Arc::default(),
            fail_first: n,
            fail_from_chunk: None,
        }
    }

    /// Succeed until `chunk - 1` chunks are committed, then always fail.
    #[must_use]
    pub fn failing_from_chunk(chunk: u64) -> Self {
        Self {
            committed: Arc::default(),
            calls: Arc::default(),
            fail_first: 0,
            fail_from_chunk: Some(chunk),
        }
    }

    #[must_use]
    pub fn committed(&self) -> Arc<Mutex<Vec<Vec<StoreHistory>>>> {
        self.committed.clone()
    }

    /// Total persist attempts, including failed ones.
    #[must_use]
    pub fn calls(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

impl SnapshotSink for FlakySink {
    fn persist(&self, chunk: &[StoreHistory]) -> Result<(), WriteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_first {
            return Err(WriteError::Database(format!("scripted failure on call {call}")));
        }

        let mut committed = self.committed.lock().unwrap();
        if let Some(fail_from) = self.fail_from_chunk {
            if committed.len() as u64 + 1 >= fail_from {
                return Err(WriteError::Database(format!(
                    "scripted failure on chunk {fail_from}"
                )));
            }
        }
        committed.push(chunk.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FailOn
// ---------------------------------------------------------------------------

/// A transformer that fails for the configured store ids and otherwise
/// snapshots normally.
pub struct FailOn {
    ids: HashSet<i64>,
}

impl FailOn {
    #[must_use]
    pub fn ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

impl Transform for FailOn {
    fn transform(&self, store: &Store) -> Result<StoreHistory, TransformError> {
        if self.ids.contains(&store.id) {
            return Err(TransformError::Materialize {
                store_id: store.id,
                reason: "scripted transform failure".into(),
            });
        }
        Ok(StoreHistory::capture(store, chrono::Utc::now()))
    }
}
