//! Chunked, transactional snapshot writer.
//!
//! [`ChunkWriter`] owns the accumulation buffer and the bounded retry
//! loop; [`SnapshotSink`] implementations own atomicity. One `persist`
//! call writes its whole chunk or none of it.

use diesel::prelude::*;
use tracing::{debug, warn};

use crate::db::model::{NewHistoryEmployeeRow, NewHistoryProductRow, NewStoreHistoryRow};
use crate::db::schema::{history_employees, history_products, store_histories};
use crate::db::DbPool;
use crate::domain::StoreHistory;
use crate::error::WriteError;

/// Atomic persistence for a chunk of snapshots.
pub trait SnapshotSink {
    /// Durably write every snapshot in `chunk`, or none of them.
    fn persist(&self, chunk: &[StoreHistory]) -> Result<(), WriteError>;
}

/// SQLite-backed sink. Each chunk (history headers plus their child
/// snapshot rows) is written inside a single transaction.
pub struct SqliteHistorySink {
    pool: DbPool,
}

impl SqliteHistorySink {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SnapshotSink for SqliteHistorySink {
    fn persist(&self, chunk: &[StoreHistory]) -> Result<(), WriteError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| WriteError::Connection(e.to_string()))?;

        conn.immediate_transaction(|conn| {
            for history in chunk {
                let header = NewStoreHistoryRow {
                    store_id: history.store_id,
                    name: history.name.clone(),
                    address: history.address.clone(),
                    captured_at: history.captured_at.to_rfc3339(),
                };
                let history_id: i64 = diesel::insert_into(store_histories::table)
                    .values(&header)
                    .returning(store_histories::id)
                    .get_result(conn)?;

                let product_rows: Vec<NewHistoryProductRow> = history
                    .products
                    .iter()
                    .map(|p| NewHistoryProductRow {
                        history_id,
                        name: p.name.clone(),
                        price_cents: p.price_cents,
                    })
                    .collect();
                if !product_rows.is_empty() {
                    diesel::insert_into(history_products::table)
                        .values(&product_rows)
                        .execute(conn)?;
                }

                let employee_rows: Vec<NewHistoryEmployeeRow> = history
                    .employees
                    .iter()
                    .map(|e| NewHistoryEmployeeRow {
                        history_id,
                        name: e.name.clone(),
                        hired_at: e.hired_at.to_string(),
                    })
                    .collect();
                if !employee_rows.is_empty() {
                    diesel::insert_into(history_employees::table)
                        .values(&employee_rows)
                        .execute(conn)?;
                }
            }
            QueryResult::Ok(())
        })
        .map_err(|e| WriteError::Database(e.to_string()))
    }
}

/// Accumulates snapshots in arrival order and flushes them through a
/// [`SnapshotSink`] as atomic chunks, retrying a failed chunk up to the
/// configured attempt count.
pub struct ChunkWriter<S: SnapshotSink> {
    sink: S,
    capacity: usize,
    attempts: u32,
    buffer: Vec<StoreHistory>,
    items_written: u64,
    chunks_committed: u64,
}

impl<S: SnapshotSink> ChunkWriter<S> {
    /// Create a writer flushing every `capacity` items, giving each
    /// chunk up to `attempts` persist attempts.
    #[must_use]
    pub fn new(sink: S, capacity: usize, attempts: u32) -> Self {
        Self {
            sink,
            capacity,
            attempts,
            buffer: Vec::with_capacity(capacity),
            items_written: 0,
            chunks_committed: 0,
        }
    }

    /// Append a snapshot to the current chunk.
    pub fn push(&mut self, item: StoreHistory) {
        self.buffer.push(item);
    }

    /// Whether the current chunk has reached capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    /// Number of accumulated, not-yet-persisted snapshots.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn items_written(&self) -> u64 {
        self.items_written
    }

    #[must_use]
    pub fn chunks_committed(&self) -> u64 {
        self.chunks_committed
    }

    /// Persist the accumulated chunk atomically.
    ///
    /// Retries the same chunk contents until the attempt budget runs
    /// out, then returns the final error. On success the buffer is
    /// cleared; on failure it is left intact (already-committed chunks
    /// are unaffected either way).
    pub fn flush(&mut self) -> Result<(), WriteError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut last_err = None;
        for attempt in 1..=self.attempts {
            match self.sink.persist(&self.buffer) {
                Ok(()) => {
                    self.items_written += self.buffer.len() as u64;
                    self.chunks_committed += 1;
                    debug!(
                        chunk = self.chunks_committed,
                        items = self.buffer.len(),
                        "chunk committed"
                    );
                    self.buffer.clear();
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.attempts,
                        items = self.buffer.len(),
                        error = %e,
                        "chunk persist failed"
                    );
                    last_err = Some(e);
                }
            }
        }

        // attempts >= 1 is validated upstream, so last_err is set here
        Err(last_err.unwrap_or_else(|| WriteError::Database("no persist attempts made".into())))
    }
}
