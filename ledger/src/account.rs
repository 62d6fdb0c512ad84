//! # Wallet Records
//!
//! [`Account`] is the persisted record: one world-state entry per wallet,
//! keyed by id. [`AccountView`] is what leaves the ledger in a response.
//! The split is the whole point of this module: the credential digest is
//! part of the record and never part of the view.
//!
//! Field names on the wire are `id`, `owner`, `balance`,
//! `credentialDigest`. Records written by the legacy implementation used
//! `name` and `password` for the first and last of those; both are accepted
//! as aliases when decoding.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::crypto::Digest;

/// The on-state wallet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique wallet id; also the world-state key.
    #[serde(alias = "name")]
    pub id: String,
    /// Display name of the holder.
    pub owner: String,
    /// Current balance.
    pub balance: Amount,
    /// Digest of the wallet password.
    #[serde(alias = "password")]
    pub credential_digest: Digest,
}

impl Account {
    /// A fresh wallet with a zero balance.
    pub fn new(id: impl Into<String>, owner: impl Into<String>, credential_digest: Digest) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            balance: Amount::ZERO,
            credential_digest,
        }
    }

    /// The public projection of this record.
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id.clone(),
            owner: self.owner.clone(),
            balance: self.balance,
        }
    }
}

/// Public fields of a wallet, as returned by `getWalletInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub owner: String,
    pub balance: Amount,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        account.view()
    }
}
