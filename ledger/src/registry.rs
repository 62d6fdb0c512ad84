//! Typed access to wallet records inside one invocation.
//!
//! The registry borrows the invocation's [`WorldState`] and does nothing
//! else: JSON in, JSON out, with absence and undecodable bytes mapped to
//! their own errors.

use crate::account::Account;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::{StoreError, WorldState};

pub struct AccountRegistry<'w, W: WorldState + ?Sized> {
    state: &'w mut W,
}

impl<'w, W: WorldState + ?Sized> AccountRegistry<'w, W> {
    pub fn new(state: &'w mut W) -> Self {
        Self { state }
    }

    /// `true` if any record is stored at `id`.
    pub fn exists(&mut self, id: &str) -> LedgerResult<bool> {
        Ok(self.state.get_state(id)?.is_some())
    }

    /// Load and decode the record at `id`.
    ///
    /// `role` names the id in the `NotFound` message ("sender", "receiver").
    pub fn load(&mut self, id: &str, role: &'static str) -> LedgerResult<Account> {
        let bytes = self
            .state
            .get_state(id)?
            .ok_or_else(|| LedgerError::NotFound {
                role,
                id: id.to_string(),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| LedgerError::CorruptRecord {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Encode and write `account` at its own id.
    pub fn save(&mut self, account: &Account) -> LedgerResult<()> {
        let bytes = serde_json::to_vec(account)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.state.put_state(&account.id, bytes)?;
        Ok(())
    }
}
