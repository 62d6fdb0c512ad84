//! # Ledger Configuration & Constants
//!
//! Reserved identifiers and defaults live here as constants. The one value
//! that must never be a constant is the expected master credential: it is
//! a deployment-time root of trust, handed to [`LedgerConfig::new`] by the
//! host process and nowhere compiled into the artifact.

use crate::amount::Amount;
use crate::crypto::{Digest, DigestError};

// ---------------------------------------------------------------------------
// Reserved Wallets
// ---------------------------------------------------------------------------

/// World-state key of the master wallet. Reserved: `createWallet` can never
/// claim it.
pub const MASTER_WALLET_ID: &str = "masterWallet";

/// Owner name recorded on the master wallet.
pub const MASTER_WALLET_OWNER: &str = "admin";

/// Initial master balance in whole units when the deployment does not
/// override it.
pub const DEFAULT_MASTER_INITIAL_UNITS: u64 = 100_000;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Deployment configuration for the ledger state machine.
///
/// Immutable once built. Every replica must be started with identical
/// values or they will disagree on the outcome of `initWallet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    master_digest: Digest,
    master_initial_balance: Amount,
}

impl LedgerConfig {
    /// Build a configuration from an already-parsed master digest.
    pub fn new(master_digest: Digest, master_initial_balance: Amount) -> Self {
        Self {
            master_digest,
            master_initial_balance,
        }
    }

    /// Build a configuration from the encoded master digest, using the
    /// default initial balance.
    pub fn from_master_digest(encoded: &str) -> Result<Self, DigestError> {
        Ok(Self::new(Digest::parse(encoded)?, default_master_balance()))
    }

    /// Replace the initial master balance.
    pub fn with_initial_balance(mut self, balance: Amount) -> Self {
        self.master_initial_balance = balance;
        self
    }

    pub fn master_digest(&self) -> &Digest {
        &self.master_digest
    }

    pub fn master_initial_balance(&self) -> Amount {
        self.master_initial_balance
    }
}

/// The default initial master balance as an [`Amount`].
pub fn default_master_balance() -> Amount {
    Amount::from_minor(DEFAULT_MASTER_INITIAL_UNITS * crate::amount::MINOR_UNITS_PER_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::digest;

    #[test]
    fn default_balance_is_one_hundred_thousand() {
        assert_eq!(default_master_balance().to_string(), "100000.00");
    }

    #[test]
    fn from_master_digest_parses_and_defaults() {
        let encoded = digest("root").to_string().to_lowercase();
        let config = LedgerConfig::from_master_digest(&encoded).unwrap();
        assert_eq!(config.master_digest(), &digest("root"));
        assert_eq!(config.master_initial_balance(), default_master_balance());
    }

    #[test]
    fn from_master_digest_rejects_plaintext() {
        let err = LedgerConfig::from_master_digest("correct horse battery staple").unwrap_err();
        assert!(matches!(err, DigestError::InvalidLength(28)));
    }

    #[test]
    fn with_initial_balance_overrides() {
        let config = LedgerConfig::new(digest("root"), default_master_balance())
            .with_initial_balance(Amount::from_minor(42));
        assert_eq!(config.master_initial_balance(), Amount::from_minor(42));
    }
}
