//! Per-item transform: live store aggregate to history snapshot.

use chrono::Utc;

use crate::domain::{Store, StoreHistory};
use crate::error::TransformError;

/// Pure mapping from a source aggregate to its snapshot.
///
/// Implementations must not mutate the store, retain a reference to it,
/// or perform I/O. The source hands over fully materialized aggregates,
/// so a transform failure means the item itself is unusable; the step
/// decides whether that fails the run or is skipped.
pub trait Transform {
    fn transform(&self, store: &Store) -> Result<StoreHistory, TransformError>;
}

/// Default transformer: deep-copies the store's state into a
/// [`StoreHistory`] stamped with the capture instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct HistoryTransformer;

impl HistoryTransformer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Transform for HistoryTransformer {
    fn transform(&self, store: &Store) -> Result<StoreHistory, TransformError> {
        Ok(StoreHistory::capture(store, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::store_with;

    #[test]
    fn transform_preserves_child_counts() {
        let store = store_with(9, "Mapo Mart", "Seoul-Mapo", 4, 2);
        let snapshot = HistoryTransformer::new().transform(&store).unwrap();

        assert_eq!(snapshot.store_id, 9);
        assert_eq!(snapshot.products.len(), 4);
        assert_eq!(snapshot.employees.len(), 2);
    }

    #[test]
    fn transform_leaves_the_source_untouched() {
        let store = store_with(3, "Jongno Mart", "Seoul-Jongno", 1, 1);
        let before = store.clone();

        let _ = HistoryTransformer::new().transform(&store).unwrap();

        assert_eq!(store, before);
    }
}
