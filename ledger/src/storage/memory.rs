//! In-memory world-state backend.
//!
//! A `BTreeMap` behind a `parking_lot::RwLock`. Reads take the shared lock;
//! `apply` takes the exclusive lock for the validate-then-write step, which
//! is what makes the commit atomic with respect to every other context.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{ReadSet, StateBackend, StoreError, StoreResult, WriteSet};

/// Volatile [`StateBackend`] for tests, benches, and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write straight into committed state, bypassing any context.
    pub fn seed(&self, key: &str, value: Vec<u8>) {
        self.entries.write().insert(key.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StateBackend for MemoryStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn apply(&self, reads: &ReadSet, writes: &WriteSet) -> StoreResult<()> {
        let mut entries = self.entries.write();

        for (key, observed) in reads {
            if entries.get(key) != observed.as_ref() {
                return Err(StoreError::Conflict { key: key.clone() });
            }
        }

        for (key, value) in writes {
            entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
