// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Wallet Ledger: Core Library
//!
//! A deterministic state-transition function over named wallets. Every
//! replica that feeds the same ordered invocations into the same prior
//! world-state must land on the same bytes, so nothing in here reads a
//! clock or draws randomness.
//!
//! ## Architecture
//!
//! - **crypto**: Credential digests (SHA-256, upper-case hex).
//! - **amount**: Fixed-point money. Integers only, two decimal places.
//! - **account**: The persisted wallet record and its public projection.
//! - **storage**: The world-state contract: per-invocation contexts with
//!   a single commit point, plus in-memory and sled backends.
//! - **registry**: Typed load/save of wallet records inside a context.
//! - **auth**: Password checks against stored digests.
//! - **ledger**: The four operations and their validation rules.
//! - **dispatch**: Operation name + string arguments → handler → response.
//! - **config**: Reserved ids, defaults, and deployment configuration.
//!
//! ## Ground Rules
//!
//! 1. Every check happens before the first write of an invocation.
//! 2. Writes only become visible through `TxContext::commit`. A failed
//!    invocation leaves no trace.
//! 3. Arithmetic on balances is checked. Money does not wrap.
//! 4. Credential digests never leave the crate in a response payload.

pub mod account;
pub mod amount;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod storage;

pub use account::{Account, AccountView};
pub use amount::Amount;
pub use config::LedgerConfig;
pub use crypto::Digest;
pub use dispatch::{invoke, Operation, Response};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::Ledger;

/// Crate version, reported by the node.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
