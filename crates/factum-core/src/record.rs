// SPDX-License-Identifier: Apache-2.0
//! The fact record itself: type, fields, predecessors, content hash.

use crate::canonical::canonical_bytes;
use crate::reference::{FactHash, FactReference};
use crate::value::FieldValue;
use sha2::{Digest, Sha512};
use std::collections::BTreeSet;

/// Predecessors bound to a single role: either exactly one fact, or an
/// ordered sequence of facts. At the API level order/duplicates in the
/// `Many` form are preserved as authored; canonicalization collapses them
/// to a sorted-unique set (see the Open Question in spec.md §9 — this
/// crate mandates set semantics for hashing regardless of call-site
/// order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predecessors {
    /// A single predecessor fact.
    One(FactReference),
    /// An ordered sequence of predecessor facts (order insignificant for
    /// hashing; duplicates collapse).
    Many(Vec<FactReference>),
}

impl Predecessors {
    /// All references carried by this role, in authored order.
    pub fn references(&self) -> Vec<&FactReference> {
        match self {
            Predecessors::One(r) => vec![r],
            Predecessors::Many(refs) => refs.iter().collect(),
        }
    }

    /// Sorted, deduplicated references — the set this role canonicalizes
    /// to for hashing purposes.
    pub fn canonical_set(&self) -> BTreeSet<FactReference> {
        self.references().into_iter().cloned().collect()
    }
}

/// An immutable fact record: type name, ordered scalar fields, and
/// predecessor references by role. Identity is [`FactRecord::hash`],
/// computed over the canonical byte form of `(fields, predecessors)` only
/// — `fact_type` is carried alongside but is not part of the hashed bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRecord {
    /// Type name of this fact.
    pub fact_type: String,
    /// Scalar fields, in the order the application supplied them. Field
    /// order here is cosmetic — canonicalization sorts keys
    /// lexicographically regardless.
    pub fields: Vec<(String, FieldValue)>,
    /// Predecessor facts by role name, in the order the application
    /// supplied them.
    pub predecessors: Vec<(String, Predecessors)>,
    /// Content hash over the canonical byte form.
    pub hash: FactHash,
}

impl FactRecord {
    /// Build a record from its parts, computing the hash.
    pub fn new(
        fact_type: impl Into<String>,
        fields: Vec<(String, FieldValue)>,
        predecessors: Vec<(String, Predecessors)>,
    ) -> Self {
        let fact_type = fact_type.into();
        let bytes = canonical_bytes(&fields, &predecessors);
        let hash = hash_bytes(&bytes);
        Self {
            fact_type,
            fields,
            predecessors,
            hash,
        }
    }

    /// This record's canonical byte form (fields and predecessors only —
    /// `fact_type` is not part of the hashed bytes).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_bytes(&self.fields, &self.predecessors)
    }

    /// `true` iff recomputing the hash over the canonical form equals the
    /// stored hash (spec.md §4.1's hash-validity invariant).
    pub fn is_hash_valid(&self) -> bool {
        hash_bytes(&self.canonical_bytes()) == self.hash
    }

    /// This record's reference (type + hash).
    pub fn reference(&self) -> FactReference {
        FactReference::new(self.fact_type.clone(), self.hash)
    }

    /// All predecessor references across every role, in role-then-authored
    /// order.
    pub fn predecessor_references(&self) -> Vec<&FactReference> {
        self.predecessors
            .iter()
            .flat_map(|(_, p)| p.references())
            .collect()
    }
}

fn hash_bytes(bytes: &[u8]) -> FactHash {
    let digest = Sha512::digest(bytes);
    let mut array = [0u8; 64];
    array.copy_from_slice(&digest);
    FactHash(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_valid_hash() {
        let record = FactRecord::new(
            "Skylane.Airline",
            vec![("identifier".into(), FieldValue::String("value".into()))],
            vec![],
        );
        assert!(record.is_hash_valid());
    }

    #[test]
    fn tampering_with_hash_invalidates_it() {
        let mut record = FactRecord::new(
            "Skylane.Airline",
            vec![("identifier".into(), FieldValue::String("value".into()))],
            vec![],
        );
        record.hash = FactHash([0u8; 64]);
        assert!(!record.is_hash_valid());
    }

    #[test]
    fn field_order_does_not_affect_hash() {
        let a = FactRecord::new(
            "T",
            vec![
                ("a".into(), FieldValue::Number(1.0)),
                ("b".into(), FieldValue::Number(2.0)),
            ],
            vec![],
        );
        let b = FactRecord::new(
            "T",
            vec![
                ("b".into(), FieldValue::Number(2.0)),
                ("a".into(), FieldValue::Number(1.0)),
            ],
            vec![],
        );
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn hash_matches_the_documented_vector_for_a_field_only_fact() {
        let record = FactRecord::new(
            "Skylane.Airline",
            vec![("identifier".into(), FieldValue::String("value".into()))],
            vec![],
        );
        assert_eq!(
            record.hash.to_base64(),
            "uXcsBceLFAkZdRD71Ztvc+QwASayHA0Zg7wC2mc3zl28N1hKTbGBfBA2OnEHAWo+0yYVeUnABMn9MCRH8cRHWg=="
        );
    }

    #[test]
    fn hash_matches_the_documented_vector_for_a_fact_with_a_predecessor() {
        let airline = FactRecord::new(
            "Skylane.Airline",
            vec![("identifier".into(), FieldValue::String("value".into()))],
            vec![],
        );
        let day = FactRecord::new(
            "Skylane.Airline.Day",
            vec![("date".into(), FieldValue::String("2021-07-04T00:00:00.000Z".into()))],
            vec![("airline".into(), Predecessors::One(airline.reference()))],
        );
        assert_eq!(
            day.hash.to_base64(),
            "cQaErYsizavFrTIGjD1C0g3shMG/uq+hVUXzs/kCzcvev9gPrVDom3pbrszUsmeRelNv8bRdIvOb6AbaYrVC7w=="
        );
    }

    #[test]
    fn predecessor_array_order_and_duplicates_do_not_affect_hash() {
        let p1 = FactReference::new("P", FactHash([1; 64]));
        let p2 = FactReference::new("P", FactHash([2; 64]));
        let a = FactRecord::new(
            "T",
            vec![],
            vec![(
                "parents".into(),
                Predecessors::Many(vec![p1.clone(), p2.clone()]),
            )],
        );
        let b = FactRecord::new(
            "T",
            vec![],
            vec![(
                "parents".into(),
                Predecessors::Many(vec![p2.clone(), p1.clone(), p2]),
            )],
        );
        assert_eq!(a.hash, b.hash);
    }
}
