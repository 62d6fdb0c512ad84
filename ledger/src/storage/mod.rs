//! # Storage Module
//!
//! The world-state contract the ledger runs against, and two backends that
//! honour it.
//!
//! ## Architecture
//!
//! ```text
//! context.rs: TxContext: per-invocation read-set/write-set, single commit
//! memory.rs:  MemoryStore: BTreeMap behind a RwLock (tests, embedding)
//! db.rs:      SledStore: persistent backend on an embedded sled tree
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Dispatcher ──begin──▶ TxContext ──read──▶ StateBackend (latest committed)
//!                          │
//!                          ├─ put_state: buffered, visible to later reads
//!                          │            in the same context only
//!                          ▼
//!                       commit ──apply(read_set, write_set)──▶ StateBackend
//! ```
//!
//! ## Optimistic Concurrency
//!
//! A context never locks anything while the ledger runs. Instead it
//! remembers what it saw. At commit the backend checks, atomically with the
//! write, that every key in the read-set still holds the observed value.
//! If another invocation committed in between, the commit fails with
//! [`StoreError::Conflict`] and nothing is written. Retrying is the
//! caller's business.

pub mod context;
pub mod db;
pub mod memory;

use std::collections::BTreeMap;

pub use context::TxContext;
pub use db::SledStore;
pub use memory::MemoryStore;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised by the world-state store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Backend(String),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("commit conflict on key {key}: state changed since it was read")]
    Conflict { key: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Read/Write Sets
// ---------------------------------------------------------------------------

/// Keys read during an invocation, with the committed value first observed
/// (`None` when the key was absent).
pub type ReadSet = BTreeMap<String, Option<Vec<u8>>>;

/// Writes buffered during an invocation, applied in key order at commit.
pub type WriteSet = BTreeMap<String, Vec<u8>>;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The view of the world-state an operation runs against.
///
/// Implemented by [`TxContext`]; anything else implementing it must give
/// read-your-writes within one invocation and keep writes invisible to
/// other invocations until the host commits.
pub trait WorldState {
    /// Read the value stored at `key`, or `None` if absent.
    fn get_state(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` at `key` within the current invocation.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StoreResult<()>;
}

/// The host store behind every [`TxContext`].
///
/// Shared across threads; each invocation gets its own context.
pub trait StateBackend: Send + Sync {
    /// Latest committed value at `key`.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Validate `reads` against committed state and apply `writes`, as one
    /// atomic step. Fails with [`StoreError::Conflict`] and applies nothing
    /// if any read is stale.
    fn apply(&self, reads: &ReadSet, writes: &WriteSet) -> StoreResult<()>;

    /// Open a transactional context on this backend.
    fn begin(&self) -> TxContext<'_, Self>
    where
        Self: Sized,
    {
        TxContext::new(self)
    }
}
