//! # Credential Hashing
//!
//! Wallet passwords are never stored. What lands in the world-state is a
//! SHA-256 digest rendered as 64 upper-case hex characters, which is the
//! encoding existing wallet records already carry.

pub mod hash;

pub use hash::{digest, sha256, Digest, DigestError};
