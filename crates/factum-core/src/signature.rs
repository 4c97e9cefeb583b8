// SPDX-License-Identifier: Apache-2.0
//! Signature envelopes.
//!
//! Key generation and PEM encoding are keystore concerns and stay out of
//! scope (spec.md §1); this module only verifies/produces raw Ed25519
//! signature bytes given a [`Signer`] the application supplies.

use crate::record::FactRecord;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature as DalekSignature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use std::fmt;

/// An Ed25519 public key, identifying a principal (`Jinaga.User` /
/// `Jinaga.Device`-equivalent facts carry one in their `publicKey`
/// field).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Base64 (standard, padded) encoding, matching the `publicKey` field
    /// format on principal facts.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse from base64 (standard, padded).
    pub fn from_base64(s: &str) -> Option<Self> {
        let bytes = STANDARD.decode(s).ok()?;
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(PublicKey(array))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

/// Raw 64-byte Ed25519 signature bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignatureBytes(pub [u8; 64]);

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureBytes({})", STANDARD.encode(self.0))
    }
}

/// A public key paired with the signature it produced over a fact's
/// canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Signer's public key.
    pub public_key: PublicKey,
    /// Signature bytes over the fact's canonical form.
    pub signature: SignatureBytes,
}

/// A fact plus the signatures attached to it. A fact may carry zero or
/// more signatures.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The signed fact.
    pub fact: FactRecord,
    /// Signatures over `fact`'s canonical bytes.
    pub signatures: Vec<Signature>,
}

impl Envelope {
    /// Merge another envelope for the *same* fact, taking the union of
    /// signatures (spec.md §3's duplicate-save invariant).
    ///
    /// Returns `false` (no-op) if the facts differ.
    pub fn merge_signatures(&mut self, other: &Envelope) -> bool {
        if self.fact.hash != other.fact.hash || self.fact.fact_type != other.fact.fact_type {
            return false;
        }
        for sig in &other.signatures {
            if !self.signatures.contains(sig) {
                self.signatures.push(sig.clone());
            }
        }
        true
    }
}

/// Something that can sign canonical fact bytes. Implementations hold the
/// private key; this crate never sees or stores one directly, matching
/// the "keystores are out of scope" boundary.
pub trait Signer {
    /// The public key corresponding to this signer's private key.
    fn public_key(&self) -> PublicKey;
    /// Sign `bytes`, returning raw signature bytes.
    fn sign_bytes(&self, bytes: &[u8]) -> SignatureBytes;
}

impl Signer for SigningKey {
    fn public_key(&self) -> PublicKey {
        PublicKey(self.verifying_key().to_bytes())
    }

    fn sign_bytes(&self, bytes: &[u8]) -> SignatureBytes {
        SignatureBytes(self.sign(bytes).to_bytes())
    }
}

/// Produce a signature over `fact`'s canonical bytes using `signer`.
pub fn sign(signer: &impl Signer, fact: &FactRecord) -> Signature {
    let bytes = fact.canonical_bytes();
    Signature {
        public_key: signer.public_key(),
        signature: signer.sign_bytes(&bytes),
    }
}

/// `true` iff every signature in `envelope` verifies against the fact's
/// canonical bytes under its declared public key, AND the fact's stored
/// hash matches the recomputed hash.
pub fn verify_envelope(envelope: &Envelope) -> bool {
    if !envelope.fact.is_hash_valid() {
        return false;
    }
    let bytes = envelope.fact.canonical_bytes();
    envelope.signatures.iter().all(|sig| verify_one(&bytes, sig))
}

fn verify_one(canonical: &[u8], sig: &Signature) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&sig.public_key.0) else {
        return false;
    };
    let signature = DalekSignature::from_bytes(&sig.signature.0);
    verifying_key.verify(canonical, &signature).is_ok()
}
