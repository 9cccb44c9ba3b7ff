//! Task id allocation
//!
//! Ids come from a persisted counter rather than a scan of the live
//! collections, so an id freed by a purge is never handed out again.
//! The counter is floored by the largest id still stored anywhere, which
//! keeps allocation safe when the counter file is missing, corrupt or
//! older than the data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Store;

/// Persisted form of the counter: `{ "last_id": n }`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounter {
    #[serde(default)]
    pub last_id: u64,
}

pub struct IdAllocator {
    store: Arc<dyn Store<IdCounter>>,
}

impl IdAllocator {
    pub fn new(store: Arc<dyn Store<IdCounter>>) -> Self {
        Self { store }
    }

    /// Reserve the next id and persist it before returning
    ///
    /// `stored_ids` are the ids present in the active and deleted
    /// collections. Callers must hold the data lock.
    pub fn allocate(&self, stored_ids: impl IntoIterator<Item = u64>) -> Result<u64> {
        let counter = self.store.load();
        let floor = stored_ids.into_iter().max().unwrap_or(0);
        let next = counter
            .last_id
            .max(floor)
            .checked_add(1)
            .ok_or_else(|| Error::OperationFailed("id space exhausted".to_string()))?;

        self.store.save(&IdCounter { last_id: next })?;
        tracing::debug!(id = next, previous = counter.last_id, floor, "allocated task id");
        Ok(next)
    }

    /// Make sure `id` counts as handed out, before its record disappears
    pub fn retire(&self, id: u64) -> Result<()> {
        let counter = self.store.load();
        if counter.last_id < id {
            self.store.save(&IdCounter { last_id: id })?;
            tracing::debug!(id, previous = counter.last_id, "counter raised to retired id");
        }
        Ok(())
    }
}
