//! # Ledger State Machine
//!
//! Four operations over wallet existence and balance:
//!
//! | Operation        | Effect                                            |
//! |------------------|---------------------------------------------------|
//! | `bootstrap`      | creates the master wallet, once, behind the master credential |
//! | `create_account` | creates a zero-balance wallet at an unused id    |
//! | `transfer`       | moves an amount from sender to receiver           |
//! | `query_balance`  | returns the public view of a wallet               |
//!
//! ## State Transitions
//!
//! A wallet id is either unused or taken. Bootstrap and create move an id
//! from unused to taken, and nothing moves it back. A taken wallet's
//! balance changes only through `transfer`:
//!
//! 1. Verify all arguments are present and the amount parses.
//! 2. Load sender, then receiver; either may be missing.
//! 3. Authenticate against the sender only.
//! 4. Verify `sender.balance >= amount` and the credit cannot overflow.
//! 5. `sender.balance -= amount`, save.
//! 6. Reload receiver through the same context, `receiver.balance += amount`, save.
//!
//! Step 6 reloads so a self-transfer sees its own debit and nets to zero.
//! Both saves land in the caller's context and become visible together at
//! its commit, or not at all.
//!
//! Operations take the invocation's [`WorldState`] explicitly and hold
//! nothing between calls.

use tracing::{debug, info, warn};

use crate::account::{Account, AccountView};
use crate::amount::Amount;
use crate::auth::{authenticate, matches_digest};
use crate::config::{LedgerConfig, MASTER_WALLET_ID, MASTER_WALLET_OWNER};
use crate::crypto::digest;
use crate::error::{LedgerError, LedgerResult};
use crate::registry::AccountRegistry;
use crate::storage::WorldState;

/// The wallet ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: LedgerConfig,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Create the master wallet.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AlreadyBootstrapped`] if the master wallet exists,
    ///   whatever the password.
    /// - [`LedgerError::Auth`] if the password does not hash to the
    ///   configured master digest.
    pub fn bootstrap<W: WorldState + ?Sized>(
        &self,
        state: &mut W,
        supplied_password: &str,
    ) -> LedgerResult<()> {
        let mut registry = AccountRegistry::new(state);

        if registry.exists(MASTER_WALLET_ID)? {
            debug!("master wallet already exists");
            return Err(LedgerError::AlreadyBootstrapped);
        }

        if !matches_digest(self.config.master_digest(), supplied_password) {
            warn!("master password rejected");
            return Err(LedgerError::Auth(MASTER_WALLET_ID.to_string()));
        }

        let master = Account {
            id: MASTER_WALLET_ID.to_string(),
            owner: MASTER_WALLET_OWNER.to_string(),
            balance: self.config.master_initial_balance(),
            credential_digest: self.config.master_digest().clone(),
        };
        registry.save(&master)?;

        info!(balance = %master.balance, "master wallet initialised");
        Ok(())
    }

    /// Create a zero-balance wallet.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] on an empty argument, or on the
    ///   reserved master id before bootstrap.
    /// - [`LedgerError::AlreadyExists`] if `id` is taken.
    pub fn create_account<W: WorldState + ?Sized>(
        &self,
        state: &mut W,
        id: &str,
        owner: &str,
        supplied_password: &str,
    ) -> LedgerResult<()> {
        require_non_empty(id, "wallet id")?;
        require_non_empty(owner, "owner")?;
        require_non_empty(supplied_password, "password")?;

        let mut registry = AccountRegistry::new(state);

        if registry.exists(id)? {
            debug!(%id, "wallet already exists");
            return Err(LedgerError::AlreadyExists(id.to_string()));
        }

        if id == MASTER_WALLET_ID {
            return Err(LedgerError::Validation(format!(
                "wallet id {MASTER_WALLET_ID} is reserved"
            )));
        }

        registry.save(&Account::new(id, owner, digest(supplied_password)))?;

        info!(%id, "wallet created");
        Ok(())
    }

    /// Move `amount_text` from `from_id` to `to_id`, authorised by the
    /// sender's password.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] on an empty argument, an amount that is
    ///   not a non-negative decimal, or a credit that would overflow.
    /// - [`LedgerError::NotFound`] for a missing sender or receiver.
    /// - [`LedgerError::Auth`] if the password is not the sender's.
    /// - [`LedgerError::InsufficientFunds`] if the sender cannot cover it.
    pub fn transfer<W: WorldState + ?Sized>(
        &self,
        state: &mut W,
        from_id: &str,
        to_id: &str,
        amount_text: &str,
        supplied_password: &str,
    ) -> LedgerResult<()> {
        require_non_empty(from_id, "sender id")?;
        require_non_empty(to_id, "receiver id")?;
        require_non_empty(amount_text, "amount")?;
        require_non_empty(supplied_password, "password")?;

        let amount = Amount::parse(amount_text)?;

        let mut registry = AccountRegistry::new(state);
        let mut sender = registry.load(from_id, "sender")?;
        let receiver_balance = registry.load(to_id, "receiver")?.balance;

        if !authenticate(&sender, supplied_password) {
            warn!(from = %from_id, "transfer rejected: bad credentials");
            return Err(LedgerError::Auth(from_id.to_string()));
        }

        let debited =
            sender
                .balance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientFunds {
                    available: sender.balance,
                    requested: amount,
                })?;

        if from_id != to_id && receiver_balance.checked_add(amount).is_none() {
            return Err(credit_overflow(to_id));
        }

        sender.balance = debited;
        registry.save(&sender)?;

        let mut receiver = registry.load(to_id, "receiver")?;
        receiver.balance = receiver
            .balance
            .checked_add(amount)
            .ok_or_else(|| credit_overflow(to_id))?;
        registry.save(&receiver)?;

        info!(from = %from_id, to = %to_id, %amount, "transfer applied");
        Ok(())
    }

    /// The public view of a wallet, for its password holder.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] on an empty argument.
    /// - [`LedgerError::NotFound`] if the wallet does not exist.
    /// - [`LedgerError::Auth`] on a wrong password.
    pub fn query_balance<W: WorldState + ?Sized>(
        &self,
        state: &mut W,
        id: &str,
        supplied_password: &str,
    ) -> LedgerResult<AccountView> {
        require_non_empty(id, "wallet id")?;
        require_non_empty(supplied_password, "password")?;

        let account = AccountRegistry::new(state).load(id, "wallet")?;

        if !authenticate(&account, supplied_password) {
            warn!(%id, "balance query rejected: bad credentials");
            return Err(LedgerError::Auth(id.to_string()));
        }

        Ok(account.view())
    }
}

fn require_non_empty(value: &str, what: &str) -> LedgerResult<()> {
    if value.is_empty() {
        return Err(LedgerError::Validation(format!(
            "{what} must be a non-empty string"
        )));
    }
    Ok(())
}

fn credit_overflow(to_id: &str) -> LedgerError {
    LedgerError::Validation(format!("transfer would overflow the balance of {to_id}"))
}
