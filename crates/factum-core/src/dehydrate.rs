// SPDX-License-Identifier: Apache-2.0
//! Dehydration/hydration between application-authored fact trees and the
//! flat, topologically-ordered record lists the rest of the system deals
//! in.
//!
//! The fluent application-facing builder is out of scope (spec.md §1);
//! [`FactInput`] is the minimal tree shape it would sit on top of.

use crate::error::InvalidGraphError;
use crate::record::{FactRecord, Predecessors};
use crate::reference::FactReference;
use crate::value::FieldValue;
use std::collections::HashMap;

/// An application-authored fact, not yet hashed. Predecessors are nested
/// `FactInput` trees; dehydration walks them depth-first so that every
/// predecessor is recorded before the fact that references it.
#[derive(Debug, Clone, PartialEq)]
pub struct FactInput {
    /// Fact type name.
    pub fact_type: String,
    /// Scalar fields.
    pub fields: Vec<(String, FieldValue)>,
    /// Predecessors by role, each itself an unhashed fact tree.
    pub predecessors: Vec<(String, PredecessorInput)>,
}

/// Predecessor role binding at the input-tree level.
#[derive(Debug, Clone, PartialEq)]
pub enum PredecessorInput {
    /// A single predecessor fact.
    One(Box<FactInput>),
    /// An ordered sequence of predecessor facts.
    Many(Vec<FactInput>),
}

/// Dehydrate `input`, recursively hashing predecessors before the facts
/// that reference them. Returns every `FactRecord` touched, in
/// topological order (predecessors first), together with the root's
/// reference. Dehydrating the same sub-tree twice (shared predecessors)
/// only emits one record for it.
pub fn dehydrate(input: &FactInput) -> (Vec<FactRecord>, FactReference) {
    let mut out = Vec::new();
    let root = dehydrate_into(input, &mut out);
    (out, root)
}

fn dehydrate_into(input: &FactInput, out: &mut Vec<FactRecord>) -> FactReference {
    let mut predecessors = Vec::with_capacity(input.predecessors.len());
    for (role, binding) in &input.predecessors {
        let resolved = match binding {
            PredecessorInput::One(child) => Predecessors::One(dehydrate_into(child, out)),
            PredecessorInput::Many(children) => Predecessors::Many(
                children
                    .iter()
                    .map(|child| dehydrate_into(child, out))
                    .collect(),
            ),
        };
        predecessors.push((role.clone(), resolved));
    }

    let record = FactRecord::new(input.fact_type.clone(), input.fields.clone(), predecessors);
    let reference = record.reference();
    // Idempotent: a fact already emitted for this hash is not duplicated.
    if !out.iter().any(|r| r.reference() == reference) {
        out.push(record);
    }
    reference
}

/// A reconstructed fact graph: every supplied record indexed by
/// reference, with predecessor links validated to resolve within the
/// same graph or an explicitly supplied closure.
#[derive(Debug, Clone, Default)]
pub struct FactGraph {
    records: HashMap<FactReference, FactRecord>,
}

impl FactGraph {
    /// Look up a record by reference.
    pub fn get(&self, reference: &FactReference) -> Option<&FactRecord> {
        self.records.get(reference)
    }

    /// Number of records in the graph.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` iff the graph holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in the graph, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &FactRecord> {
        self.records.values()
    }
}

/// Reconstruct a [`FactGraph`] from `records`, validating that every
/// predecessor referenced by a record in `references` (transitively)
/// resolves to a record present in `records`.
///
/// # Errors
///
/// Returns [`InvalidGraphError::MissingPredecessor`] if a predecessor of
/// a reachable fact is absent from `records`.
pub fn hydrate(
    references: &[FactReference],
    records: &[FactRecord],
) -> Result<FactGraph, InvalidGraphError> {
    let mut by_reference: HashMap<FactReference, FactRecord> = HashMap::new();
    for record in records {
        by_reference.insert(record.reference(), record.clone());
    }

    let mut stack: Vec<FactReference> = references.to_vec();
    let mut reachable: HashMap<FactReference, FactRecord> = HashMap::new();
    while let Some(reference) = stack.pop() {
        if reachable.contains_key(&reference) {
            continue;
        }
        let Some(record) = by_reference.get(&reference) else {
            return Err(InvalidGraphError::MissingPredecessor(reference));
        };
        for predecessor in record.predecessor_references() {
            stack.push(predecessor.clone());
        }
        reachable.insert(reference, record.clone());
    }

    Ok(FactGraph { records: reachable })
}
