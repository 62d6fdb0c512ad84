//! Error types for ledger operations.
//!
//! Every operation returns a [`LedgerError`]. The variants are exhaustive
//! over the ways an invocation can fail; [`ErrorKind`] is the stable,
//! data-free tag that crosses the dispatcher boundary alongside the
//! human-readable message.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::amount::{Amount, AmountError};
use crate::storage::StoreError;

/// Errors that can occur while executing a ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A malformed, empty, non-numeric, or negative argument.
    #[error("{0}")]
    Validation(String),

    /// The referenced wallet does not exist.
    #[error("{role} wallet does not exist: {id}")]
    NotFound {
        /// Which side of the operation the id was supplied for.
        role: &'static str,
        /// The missing wallet id.
        id: String,
    },

    /// A wallet with this id already exists.
    #[error("wallet already exists: {0}")]
    AlreadyExists(String),

    /// The master wallet has already been initialised.
    #[error("master wallet already exists")]
    AlreadyBootstrapped,

    /// The supplied password does not match the stored digest.
    #[error("authentication failed for wallet: {0}")]
    Auth(String),

    /// The sender's balance does not cover the transfer.
    #[error("insufficient funds: balance {available}, requested {requested}")]
    InsufficientFunds {
        /// Sender balance at the time of the check.
        available: Amount,
        /// Amount the caller tried to move.
        requested: Amount,
    },

    /// The world-state store failed or rejected the commit.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored record could not be decoded into a wallet.
    #[error("corrupt record for wallet {id}: {reason}")]
    CorruptRecord {
        /// Key of the undecodable record.
        id: String,
        /// Decoder message.
        reason: String,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}

/// Data-free classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    AlreadyBootstrapped,
    Auth,
    InsufficientFunds,
    Conflict,
    Store,
    CorruptRecord,
    UnknownOperation,
}

impl ErrorKind {
    /// `true` for failures caused by the caller's input rather than the
    /// host store. The node uses this to pick a 4xx over a 5xx.
    pub fn is_client_error(self) -> bool {
        !matches!(
            self,
            ErrorKind::Conflict | ErrorKind::Store | ErrorKind::CorruptRecord
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::AlreadyBootstrapped => "already_bootstrapped",
            ErrorKind::Auth => "auth",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Store => "store",
            ErrorKind::CorruptRecord => "corrupt_record",
            ErrorKind::UnknownOperation => "unknown_operation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LedgerError::AlreadyBootstrapped => ErrorKind::AlreadyBootstrapped,
            LedgerError::Auth(_) => ErrorKind::Auth,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::Store(StoreError::Conflict { .. }) => ErrorKind::Conflict,
            LedgerError::Store(_) => ErrorKind::Store,
            LedgerError::CorruptRecord { .. } => ErrorKind::CorruptRecord,
        }
    }
}
