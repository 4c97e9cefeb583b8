// SPDX-License-Identifier: Apache-2.0
//! The `save` wire format (spec.md §6): a list of envelopes, each
//! `{fact: {type, hash, predecessors, fields}, signatures: [...]}`, with
//! predecessors serialized as `role -> (reference | [reference])`.

use crate::error::WireError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use factum_core::{
    Envelope, FactHash, FactRecord, FactReference, FieldValue, PublicKey, Predecessors, Signature,
    SignatureBytes,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireReference {
    #[serde(rename = "type")]
    fact_type: String,
    hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WirePredecessors {
    One(WireReference),
    Many(Vec<WireReference>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFact {
    #[serde(rename = "type")]
    fact_type: String,
    hash: String,
    predecessors: BTreeMap<String, WirePredecessors>,
    fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireSignature {
    public_key: String,
    signature: String,
}

/// An envelope in its `save`-endpoint wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEnvelope {
    fact: WireFact,
    signatures: Vec<WireSignature>,
}

/// A batch of envelopes as transmitted to/from the `save` endpoint.
pub type WireBatch = Vec<WireEnvelope>;

fn reference_to_wire(reference: &FactReference) -> WireReference {
    WireReference { fact_type: reference.fact_type.clone(), hash: reference.hash.to_base64() }
}

fn reference_from_wire(wire: &WireReference) -> Result<FactReference, WireError> {
    let hash = FactHash::from_base64(&wire.hash).ok_or(WireError::InvalidBase64("predecessor hash"))?;
    Ok(FactReference::new(wire.fact_type.clone(), hash))
}

/// Serialize a batch of envelopes into the `save` wire shape.
#[must_use]
pub fn to_wire_batch(envelopes: &[Envelope]) -> WireBatch {
    envelopes.iter().map(to_wire).collect()
}

/// Serialize one envelope into the `save` wire shape.
#[must_use]
pub fn to_wire(envelope: &Envelope) -> WireEnvelope {
    let predecessors = envelope
        .fact
        .predecessors
        .iter()
        .map(|(role, p)| {
            let wire = match p {
                Predecessors::One(r) => WirePredecessors::One(reference_to_wire(r)),
                Predecessors::Many(rs) => WirePredecessors::Many(rs.iter().map(reference_to_wire).collect()),
            };
            (role.clone(), wire)
        })
        .collect();
    let fields = envelope.fact.fields.iter().cloned().collect();
    let signatures = envelope
        .signatures
        .iter()
        .map(|s| WireSignature { public_key: s.public_key.to_base64(), signature: STANDARD.encode(s.signature.0) })
        .collect();
    WireEnvelope {
        fact: WireFact {
            fact_type: envelope.fact.fact_type.clone(),
            hash: envelope.fact.hash.to_base64(),
            predecessors,
            fields,
        },
        signatures,
    }
}

/// Parse a batch of envelopes from the `save` wire shape, recomputing
/// every fact's hash from its canonical form and rejecting batches where
/// the declared hash disagrees.
pub fn from_wire_batch(batch: WireBatch) -> Result<Vec<Envelope>, WireError> {
    batch.into_iter().map(from_wire).collect()
}

/// Parse one envelope from the `save` wire shape.
pub fn from_wire(wire: WireEnvelope) -> Result<Envelope, WireError> {
    let predecessors = wire
        .fact
        .predecessors
        .into_iter()
        .map(|(role, p)| -> Result<(String, Predecessors), WireError> {
            let predecessors = match p {
                WirePredecessors::One(r) => Predecessors::One(reference_from_wire(&r)?),
                WirePredecessors::Many(rs) => {
                    Predecessors::Many(rs.iter().map(reference_from_wire).collect::<Result<_, _>>()?)
                }
            };
            Ok((role, predecessors))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let fields: Vec<(String, FieldValue)> = wire.fact.fields.into_iter().collect();
    let declared_hash =
        FactHash::from_base64(&wire.fact.hash).ok_or(WireError::InvalidBase64("fact hash"))?;
    let fact = FactRecord::new(wire.fact.fact_type, fields, predecessors);
    if fact.hash != declared_hash {
        return Err(WireError::Malformed(format!("declared hash does not match canonical form for {}", fact.fact_type)));
    }
    let signatures = wire
        .signatures
        .into_iter()
        .map(|s| -> Result<Signature, WireError> {
            let public_key =
                PublicKey::from_base64(&s.public_key).ok_or(WireError::InvalidBase64("signature public key"))?;
            let bytes = STANDARD.decode(&s.signature).map_err(|_| WireError::InvalidBase64("signature bytes"))?;
            let array: [u8; 64] = bytes.try_into().map_err(|_| WireError::InvalidBase64("signature bytes"))?;
            Ok(Signature { public_key, signature: SignatureBytes(array) })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Envelope { fact, signatures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::sign;
    use rand::rngs::OsRng;
    use ed25519_dalek::SigningKey;

    #[test]
    fn round_trips_a_signed_envelope_with_predecessors() {
        let parent = FactRecord::new("Parent", vec![("name".into(), FieldValue::String("a".into()))], vec![]);
        let parent_ref = parent.reference();
        let child = FactRecord::new(
            "Child",
            vec![],
            vec![("parent".into(), Predecessors::One(parent_ref))],
        );
        let signing_key = SigningKey::generate(&mut OsRng);
        let signature = sign(&signing_key, &child);
        let envelope = Envelope { fact: child, signatures: vec![signature] };

        let wire = to_wire(&envelope);
        let round_tripped = from_wire(wire).unwrap();
        assert_eq!(round_tripped, envelope);
    }

    #[test]
    fn rejects_a_tampered_declared_hash() {
        let fact = FactRecord::new("A", vec![], vec![]);
        let envelope = Envelope { fact, signatures: vec![] };
        let mut wire = to_wire(&envelope);
        wire.fact.hash = FactHash([0u8; 64]).to_base64();
        assert!(matches!(from_wire(wire), Err(WireError::Malformed(_))));
    }

    #[test]
    fn many_predecessors_round_trip_through_wire() {
        let p1 = FactRecord::new("P", vec![], vec![]);
        let p2 = FactRecord::new("P", vec![("n".into(), FieldValue::Number(2.0))], vec![]);
        let child = FactRecord::new(
            "Child",
            vec![],
            vec![("parents".into(), Predecessors::Many(vec![p1.reference(), p2.reference()]))],
        );
        let envelope = Envelope { fact: child, signatures: vec![] };
        let wire = to_wire(&envelope);
        let json = serde_json::to_string(&wire).unwrap();
        let parsed: WireEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(from_wire(parsed).unwrap(), envelope);
    }
}
