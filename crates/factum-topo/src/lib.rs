// SPDX-License-Identifier: Apache-2.0
//! Topological ordering over a bag of fact records.
//!
//! Orders records so every predecessor present in the input precedes its
//! successors. Predecessors absent from the input are treated as
//! pre-satisfied (they are assumed to already exist in storage).
//! Implementation is a ready-set-driven Kahn's algorithm: a
//! reverse-dependency counter per record, with newly-ready records
//! appended to a FIFO queue so output is stable on insertion order among
//! records that become ready at the same time.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

use factum_core::{FactRecord, FactReference, InvalidGraphError};
use std::collections::{HashMap, VecDeque};

/// Sort `records` so that every predecessor referenced by a record (that
/// is itself present in `records`) appears earlier in the output.
///
/// # Errors
///
/// Returns [`InvalidGraphError::Cycle`] if the input cannot be fully
/// ordered — unreachable for validly hashed facts, since the hash closes
/// over predecessors and cannot reference itself, but malformed input
/// (e.g. hand-built test fixtures) can still trigger it.
pub fn sort(records: Vec<FactRecord>) -> Result<Vec<FactRecord>, InvalidGraphError> {
    let references: Vec<FactReference> = records.iter().map(FactRecord::reference).collect();
    let index_by_reference: HashMap<FactReference, usize> = references
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, r)| (r, i))
        .collect();

    let mut indegree = vec![0usize; records.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); records.len()];

    for (i, record) in records.iter().enumerate() {
        for predecessor in record.predecessor_references() {
            if let Some(&pred_idx) = index_by_reference.get(predecessor) {
                indegree[i] += 1;
                dependents[pred_idx].push(i);
            }
            // Predecessor not in the input set: treated as pre-satisfied.
        }
    }

    let mut ready: VecDeque<usize> = VecDeque::new();
    for (i, &degree) in indegree.iter().enumerate() {
        if degree == 0 {
            ready.push_back(i);
        }
    }

    let mut order = Vec::with_capacity(records.len());
    let mut emitted = vec![false; records.len()];
    while let Some(idx) = ready.pop_front() {
        if emitted[idx] {
            continue;
        }
        emitted[idx] = true;
        order.push(idx);
        for &dependent in &dependents[idx] {
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if order.len() != records.len() {
        return Err(InvalidGraphError::Cycle);
    }

    Ok(order.into_iter().map(|i| records[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::{FieldValue, Predecessors};

    fn leaf(id: &str) -> FactRecord {
        FactRecord::new("Leaf", vec![("id".into(), FieldValue::String(id.into()))], vec![])
    }

    #[test]
    fn predecessor_precedes_successor() {
        let parent = leaf("p");
        let child = FactRecord::new(
            "Child",
            vec![],
            vec![("parent".into(), Predecessors::One(parent.reference()))],
        );
        let sorted = sort(vec![child.clone(), parent.clone()]).unwrap();
        let parent_pos = sorted.iter().position(|r| r.hash == parent.hash).unwrap();
        let child_pos = sorted.iter().position(|r| r.hash == child.hash).unwrap();
        assert!(parent_pos < child_pos);
    }

    #[test]
    fn missing_predecessor_is_pre_satisfied() {
        let dangling_parent_ref =
            factum_core::FactReference::new("Ghost", factum_core::FactHash([9; 64]));
        let child = FactRecord::new(
            "Child",
            vec![],
            vec![(
                "parent".into(),
                Predecessors::One(dangling_parent_ref),
            )],
        );
        let sorted = sort(vec![child]).unwrap();
        assert_eq!(sorted.len(), 1);
    }

    #[test]
    fn every_predecessor_in_input_appears_before_its_successor() {
        let a = leaf("a");
        let b = FactRecord::new(
            "B",
            vec![],
            vec![("a".into(), Predecessors::One(a.reference()))],
        );
        let c = FactRecord::new(
            "C",
            vec![],
            vec![("b".into(), Predecessors::One(b.reference()))],
        );
        let sorted = sort(vec![c.clone(), a.clone(), b.clone()]).unwrap();
        for (position, record) in sorted.iter().enumerate() {
            for predecessor in record.predecessor_references() {
                if let Some(pred_position) =
                    sorted.iter().position(|r| r.reference() == *predecessor)
                {
                    assert!(pred_position < position);
                }
            }
        }
    }

    #[test]
    fn stable_on_insertion_order_among_ready_records() {
        let a = leaf("a");
        let b = leaf("b");
        let sorted = sort(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(sorted[0].hash, a.hash);
        assert_eq!(sorted[1].hash, b.hash);
    }
}
