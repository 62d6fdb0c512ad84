//! # Digest
//!
//! One-way, deterministic credential hashing. SHA-256 only: every replica
//! must produce identical bytes for identical input, and the digests already
//! sitting in the world-state were produced with SHA-256.
//!
//! The encoded form is 64 upper-case hex characters. Parsing accepts either
//! case and normalises, so a digest pasted from `sha256sum` (lower-case)
//! still compares equal to one read from a stored record.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// Length of an encoded digest in characters.
pub const DIGEST_HEX_LENGTH: usize = 64;

/// Errors produced when parsing an encoded digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    #[error("digest must be {DIGEST_HEX_LENGTH} hex characters, got {0}")]
    InvalidLength(usize),

    #[error("digest is not valid hex: {0}")]
    InvalidHex(String),
}

/// Compute the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a secret into its stored credential form.
///
/// # Example
///
/// ```
/// use wallet_ledger::crypto::digest;
///
/// let d = digest("hunter2");
/// assert_eq!(d.as_str().len(), 64);
/// assert_eq!(d, digest("hunter2"));
/// ```
pub fn digest(secret: &str) -> Digest {
    Digest(hex::encode_upper(sha256(secret.as_bytes())))
}

/// An encoded SHA-256 credential digest.
///
/// Always 64 upper-case hex characters. Construct through [`digest`] or
/// [`Digest::parse`]; deserialization goes through `parse` as well, so a
/// record with a mangled digest fails to decode instead of silently never
/// matching.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Parse an encoded digest, accepting upper- or lower-case hex.
    pub fn parse(encoded: &str) -> Result<Self, DigestError> {
        let trimmed = encoded.trim();
        if trimmed.len() != DIGEST_HEX_LENGTH {
            return Err(DigestError::InvalidLength(trimmed.len()));
        }
        hex::decode(trimmed).map_err(|e| DigestError::InvalidHex(e.to_string()))?;
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The encoded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time equality over the encoded bytes.
    ///
    /// Both sides are fixed-length after parsing, so the comparison time
    /// depends on neither the position nor the presence of a mismatch.
    pub fn ct_matches(&self, other: &Digest) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(value: Digest) -> Self {
        value.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Digests are credentials. Keep them out of debug logs.
impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}..)", &self.0[..8])
    }
}
