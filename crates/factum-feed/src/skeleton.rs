// SPDX-License-Identifier: Apache-2.0
//! Feed skeletons (spec.md §4.6): the path-condition shape of a
//! specification, with not-exists conditions flattened in at one level.

use factum_spec::{Condition, Label, Match, Specification};

/// A fact slot in a skeleton: either a given or a match's unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactNode {
    /// Binding name.
    pub label: String,
    /// Fact type constraining this slot.
    pub fact_type: String,
}

/// Which index the [`Edge`] resolves through: `Successor` walks the
/// inverse (child-lookup) index from the anchor; `Predecessor` is a
/// direct lookup, the anchor already named by its own chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Candidate generated via the inverse (successor) index.
    Successor,
    /// Candidate resolved directly by a predecessor-role walk.
    Predecessor,
}

/// A positive path condition between two fact slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Index of the fact slot this edge is conditioning.
    pub from: usize,
    /// Index of the already-bound fact slot the edge anchors to.
    pub to: usize,
    /// Role names carried on the edge.
    pub roles: Vec<String>,
    /// Lookup direction.
    pub kind: EdgeKind,
}

/// The skeleton of a specification: its fact slots, the edges between
/// them, and the fact slots introduced under a not-exists condition
/// (flattened one level; deeper existentials are preserved on the
/// specification but excluded from skeleton shape, per spec.md §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Skeleton {
    /// All fact slots: givens first, then match unknowns in declaration
    /// order.
    pub facts: Vec<FactNode>,
    /// Indices into `facts` for the specification's givens.
    pub inputs: Vec<usize>,
    /// Positive path-condition edges.
    pub edges: Vec<Edge>,
    /// Indices into `facts` of not-exists unknowns.
    pub not_exists: Vec<usize>,
}

/// Build the skeleton of `specification`.
#[must_use]
pub fn skeleton_of(specification: &Specification) -> Skeleton {
    let mut skeleton = Skeleton::default();
    for given in &specification.givens {
        push_fact(&mut skeleton, given);
        skeleton.inputs.push(skeleton.facts.len() - 1);
    }
    add_matches(&mut skeleton, &specification.matches);
    skeleton
}

fn push_fact(skeleton: &mut Skeleton, label: &Label) {
    skeleton.facts.push(FactNode {
        label: label.name.clone(),
        fact_type: label.fact_type.clone(),
    });
}

fn label_index(skeleton: &Skeleton, name: &str) -> Option<usize> {
    skeleton.facts.iter().position(|f| f.label == name)
}

fn add_matches(skeleton: &mut Skeleton, matches: &[Match]) {
    for m in matches {
        push_fact(skeleton, &m.unknown);
        let idx = skeleton.facts.len() - 1;
        for condition in &m.conditions {
            match condition {
                Condition::Path { left, right } if left.label == m.unknown.name => {
                    if let Some(to) = label_index(skeleton, &right.label) {
                        let (roles, kind) = if left.roles.is_empty() {
                            (right.roles.clone(), EdgeKind::Predecessor)
                        } else {
                            (left.roles.clone(), EdgeKind::Successor)
                        };
                        skeleton.edges.push(Edge {
                            from: idx,
                            to,
                            roles,
                            kind,
                        });
                    }
                }
                Condition::Path { .. } => {}
                Condition::Existential { exists: false, matches: nested } => {
                    for nm in nested {
                        push_fact(skeleton, &nm.unknown);
                        skeleton.not_exists.push(skeleton.facts.len() - 1);
                    }
                }
                Condition::Existential { exists: true, .. } => {}
            }
        }
    }
}

/// Structural equivalence under input permutation (spec.md §4.9):
/// described by type rather than by raw slot index, so reordering
/// givens of matching types yields an identical shape.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Shape {
    fact_types: Vec<String>,
    input_types: Vec<String>,
    edges: Vec<(String, Vec<String>, String, String)>,
    not_exists_types: Vec<String>,
}

fn shape_of(skeleton: &Skeleton) -> Shape {
    let mut fact_types: Vec<String> = skeleton.facts.iter().map(|f| f.fact_type.clone()).collect();
    fact_types.sort();

    let mut input_types: Vec<String> = skeleton
        .inputs
        .iter()
        .map(|&i| skeleton.facts[i].fact_type.clone())
        .collect();
    input_types.sort();

    let mut edges: Vec<(String, Vec<String>, String, String)> = skeleton
        .edges
        .iter()
        .map(|e| {
            let kind = match e.kind {
                EdgeKind::Successor => "successor".to_string(),
                EdgeKind::Predecessor => "predecessor".to_string(),
            };
            (
                kind,
                e.roles.clone(),
                skeleton.facts[e.from].fact_type.clone(),
                skeleton.facts[e.to].fact_type.clone(),
            )
        })
        .collect();
    edges.sort();

    let mut not_exists_types: Vec<String> = skeleton
        .not_exists
        .iter()
        .map(|&i| skeleton.facts[i].fact_type.clone())
        .collect();
    not_exists_types.sort();

    Shape {
        fact_types,
        input_types,
        edges,
        not_exists_types,
    }
}

/// `true` iff `a` and `b` describe the same feed shape (spec.md §4.9's
/// "equal as unordered sets after permutation of inputs").
#[must_use]
pub fn equivalent(a: &Skeleton, b: &Skeleton) -> bool {
    shape_of(a) == shape_of(b)
}
