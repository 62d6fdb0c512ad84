//! Password authentication against stored digests.

use crate::account::Account;
use crate::crypto::{digest, Digest};

/// `true` iff `supplied_password` hashes to the wallet's stored digest.
pub fn authenticate(account: &Account, supplied_password: &str) -> bool {
    matches_digest(&account.credential_digest, supplied_password)
}

/// `true` iff `supplied_password` hashes to `expected`. Constant-time over
/// the encoded digests.
pub fn matches_digest(expected: &Digest, supplied_password: &str) -> bool {
    digest(supplied_password).ct_matches(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_authenticates() {
        let account = Account::new("alice", "Alice", digest("pw1"));
        assert!(authenticate(&account, "pw1"));
    }

    #[test]
    fn wrong_password_rejected() {
        let account = Account::new("alice", "Alice", digest("pw1"));
        assert!(!authenticate(&account, "pw2"));
        assert!(!authenticate(&account, ""));
    }

    #[test]
    fn digest_itself_is_not_a_password() {
        let stored = digest("pw1");
        let account = Account::new("alice", "Alice", stored.clone());
        assert!(!authenticate(&account, stored.as_str()));
    }
}
