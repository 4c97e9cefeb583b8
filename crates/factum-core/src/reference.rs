// SPDX-License-Identifier: Apache-2.0
//! Fact hashes and references.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

/// A 64-byte SHA-512 content hash over a fact's canonical byte form.
///
/// Thin newtype over `[u8; 64]`, following the `BlobHash` pattern: inner
/// bytes are public for zero-cost access, `Display` renders the
/// standard-alphabet, padded base64 form used on the wire.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactHash(pub [u8; 64]);

impl FactHash {
    /// View the hash as a byte slice.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Base64 (standard, padded) encoding, as carried on the wire.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse a hash from its base64 (standard, padded) encoding.
    pub fn from_base64(s: &str) -> Option<Self> {
        let bytes = STANDARD.decode(s).ok()?;
        let array: [u8; 64] = bytes.try_into().ok()?;
        Some(FactHash(array))
    }
}

impl fmt::Display for FactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for FactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactHash({})", self.to_base64())
    }
}

/// A reference to a fact by (type, hash). Equality is structural on both.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactReference {
    /// Fact type name.
    pub fact_type: String,
    /// Content hash of the referenced fact.
    pub hash: FactHash,
}

impl FactReference {
    /// Build a reference from parts.
    pub fn new(fact_type: impl Into<String>, hash: FactHash) -> Self {
        Self {
            fact_type: fact_type.into(),
            hash,
        }
    }
}

impl fmt::Display for FactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fact_type, self.hash)
    }
}
