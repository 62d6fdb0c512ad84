//! # SledStore: persistent world-state
//!
//! The durable backend, built on sled's embedded key-value store. All
//! wallet records live in one named tree:
//!
//! | Tree       | Key                  | Value                  |
//! |------------|----------------------|------------------------|
//! | `accounts` | wallet id (UTF-8)    | JSON wallet record     |
//!
//! ## Atomicity
//!
//! `apply` runs one sled transaction over the `accounts` tree: it re-reads
//! every key in the context's read-set, aborts on the first value that no
//! longer matches, and otherwise inserts the whole write-set. Either every
//! write of an invocation lands or none does.
//!
//! The transaction is the commit point. The flush that follows only
//! affects durability: if it fails, the commit still stands and the
//! failure is logged.

use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
};
use sled::{Db, Tree};
use std::path::Path;
use tracing::warn;

use super::{ReadSet, StateBackend, StoreError, StoreResult, WriteSet};

/// Name of the sled tree holding wallet records.
const ACCOUNTS_TREE: &str = "accounts";

/// Persistent [`StateBackend`] on sled.
///
/// Cheap to clone; sled handles are reference counted and safe to share
/// across threads.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    accounts: Tree,
}

impl SledStore {
    /// Open or create a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store that lives in a temporary location and is removed on drop.
    pub fn open_temporary() -> StoreResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let accounts = db.open_tree(ACCOUNTS_TREE)?;
        Ok(Self { db, accounts })
    }

    /// Number of wallet records stored.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Block until every committed write is durable.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// Report the outcome of the flush that follows a committed transaction.
///
/// The writes are already applied and visible when this runs, so a failed
/// flush cannot fail the invocation. It is logged, and sled retries
/// durability on its next flush. Returns `true` when the flush succeeded.
fn settle_flush(outcome: sled::Result<usize>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "committed writes not yet flushed to disk");
            false
        }
    }
}

impl StateBackend for SledStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.accounts.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn apply(&self, reads: &ReadSet, writes: &WriteSet) -> StoreResult<()> {
        let result = self
            .accounts
            .transaction(|tx| -> ConflictableTransactionResult<(), String> {
                for (key, observed) in reads {
                    let current = tx.get(key.as_bytes())?;
                    if current.as_deref() != observed.as_deref() {
                        return Err(ConflictableTransactionError::Abort(key.clone()));
                    }
                }
                for (key, value) in writes {
                    tx.insert(key.as_bytes(), value.as_slice())?;
                }
                Ok(())
            });

        match result {
            Ok(()) => {
                settle_flush(self.db.flush());
                Ok(())
            }
            Err(TransactionError::Abort(key)) => {
                warn!(%key, "commit aborted: read-set is stale");
                Err(StoreError::Conflict { key })
            }
            Err(TransactionError::Storage(e)) => Err(StoreError::Sled(e)),
        }
    }
}
