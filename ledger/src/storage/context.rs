//! # TxContext: one invocation's view of the world-state
//!
//! Reads go to the backend once per key and are remembered; later reads of
//! the same key see the same bytes (or the context's own write, if there
//! is one). Writes sit in an ordered buffer until [`TxContext::commit`],
//! which is the only way anything reaches the backend. Dropping a context
//! without committing discards it.

use tracing::debug;

use super::{ReadSet, StateBackend, StoreResult, WorldState, WriteSet};

/// A transactional context over a [`StateBackend`].
pub struct TxContext<'a, B: StateBackend + ?Sized> {
    backend: &'a B,
    reads: ReadSet,
    writes: WriteSet,
}

impl<'a, B: StateBackend + ?Sized> TxContext<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            reads: ReadSet::new(),
            writes: WriteSet::new(),
        }
    }

    /// Keys read from the backend so far, with the observed values.
    pub fn read_set(&self) -> &ReadSet {
        &self.reads
    }

    /// Writes buffered so far.
    pub fn write_set(&self) -> &WriteSet {
        &self.writes
    }

    /// Commit every buffered write as one atomic unit.
    ///
    /// A context that wrote nothing has nothing to publish and commits
    /// trivially. Otherwise the backend validates the read-set and applies
    /// the write-set together, or fails and applies nothing.
    pub fn commit(self) -> StoreResult<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        debug!(
            reads = self.reads.len(),
            writes = self.writes.len(),
            "committing world-state context"
        );
        self.backend.apply(&self.reads, &self.writes)
    }
}

impl<B: StateBackend + ?Sized> WorldState for TxContext<'_, B> {
    fn get_state(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if let Some(pending) = self.writes.get(key) {
            return Ok(Some(pending.clone()));
        }
        if let Some(observed) = self.reads.get(key) {
            return Ok(observed.clone());
        }
        let value = self.backend.read(key)?;
        self.reads.insert(key.to_string(), value.clone());
        Ok(value)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.writes.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreError};

    #[test]
    fn reads_see_own_writes() {
        let store = MemoryStore::new();
        let mut ctx = store.begin();

        assert_eq!(ctx.get_state("k").unwrap(), None);
        ctx.put_state("k", b"v1".to_vec()).unwrap();
        assert_eq!(ctx.get_state("k").unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn writes_invisible_until_commit() {
        let store = MemoryStore::new();
        let mut ctx = store.begin();
        ctx.put_state("k", b"v1".to_vec()).unwrap();

        assert_eq!(store.read("k").unwrap(), None);
        ctx.commit().unwrap();
        assert_eq!(store.read("k").unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn dropped_context_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut ctx = store.begin();
            ctx.put_state("k", b"v1".to_vec()).unwrap();
        }
        assert_eq!(store.read("k").unwrap(), None);
    }

    #[test]
    fn repeated_reads_are_stable() {
        let store = MemoryStore::new();
        store.seed("k", b"before".to_vec());

        let mut ctx = store.begin();
        assert_eq!(ctx.get_state("k").unwrap(), Some(b"before".to_vec()));

        store.seed("k", b"after".to_vec());
        assert_eq!(ctx.get_state("k").unwrap(), Some(b"before".to_vec()));
    }

    #[test]
    fn stale_read_fails_commit() {
        let store = MemoryStore::new();
        store.seed("alice", b"100".to_vec());

        let mut first = store.begin();
        let mut second = store.begin();

        first.get_state("alice").unwrap();
        second.get_state("alice").unwrap();

        first.put_state("alice", b"50".to_vec()).unwrap();
        second.put_state("alice", b"70".to_vec()).unwrap();

        first.commit().unwrap();
        let err = second.commit().unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref key } if key == "alice"));
        assert_eq!(store.read("alice").unwrap(), Some(b"50".to_vec()));
    }

    #[test]
    fn read_only_context_commits_trivially() {
        let store = MemoryStore::new();
        let mut ctx = store.begin();
        ctx.get_state("nobody").unwrap();
        store.seed("nobody", b"now here".to_vec());
        ctx.commit().unwrap();
    }
}
