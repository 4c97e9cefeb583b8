// SPDX-License-Identifier: Apache-2.0
//! Declarative specification AST: givens, matches, path/existential
//! conditions, and projections.
//!
//! Labels are scoped: givens are visible to every match and to the
//! projection; each match's unknown is visible to later sibling matches
//! and to their descendants. Existential conditions introduce a nested
//! scope — they add no labels to the enclosing scope.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

/// A named, typed input or intermediate binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Binding name, unique within its scope.
    pub name: String,
    /// Fact type this label is constrained to.
    pub fact_type: String,
}

impl Label {
    /// Construct a label.
    pub fn new(name: impl Into<String>, fact_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fact_type: fact_type.into(),
        }
    }
}

/// A chain of predecessor-role steps rooted at a label. `roles[0]` is the
/// role followed first (from the label outward); direction of lookup
/// (direct predecessor vs. inverse successor index) is decided by the
/// evaluator at execution time, not encoded here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chain {
    /// Label this chain starts from.
    pub label: String,
    /// Ordered role names.
    pub roles: Vec<String>,
}

impl Chain {
    /// A chain with no role steps — the label itself.
    pub fn label_only(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            roles: Vec::new(),
        }
    }

    /// Append a role step.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// A single condition constraining a match's unknown.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Two predecessor chains must resolve to the same fact.
    Path {
        /// Chain rooted at the unknown being constrained.
        left: Chain,
        /// Chain rooted at another, already-bound label.
        right: Chain,
    },
    /// A nested specification must (or must not) produce a result.
    Existential {
        /// `true` for `exists`, `false` for `not-exists`.
        exists: bool,
        /// Nested matches, in their own scope.
        matches: Vec<Match>,
    },
}

/// A clause introducing an unknown fact constrained by an ordered list of
/// conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// The unknown this match introduces.
    pub unknown: Label,
    /// Ordered conditions the unknown must satisfy.
    pub conditions: Vec<Condition>,
}

/// What a specification (or nested specification) produces per result
/// tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// The fact reference bound to a label.
    Label(String),
    /// A single scalar field read from the fact bound to a label.
    Field {
        /// Label to read from.
        label: String,
        /// Field name.
        field: String,
    },
    /// The content hash of the fact bound to a label.
    Hash(String),
    /// A named mapping of sub-projections.
    Composite(Vec<(String, Projection)>),
    /// A nested specification, evaluated with the enclosing tuple as
    /// givens and flattened into a sequence of results.
    Collection(Box<Specification>),
}

/// A declarative specification: named typed inputs, an ordered list of
/// matches, and a projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    /// Named typed inputs, bound at query time.
    pub givens: Vec<Label>,
    /// Ordered matches.
    pub matches: Vec<Match>,
    /// Result projection.
    pub projection: Projection,
}

impl Specification {
    /// A specification is *identity* if it has no matches and its
    /// projection is a direct reference to one of its givens. Returns
    /// the given's name when so.
    pub fn identity_given(&self) -> Option<&str> {
        if !self.matches.is_empty() {
            return None;
        }
        let Projection::Label(name) = &self.projection else {
            return None;
        };
        self.givens
            .iter()
            .any(|g| &g.name == name)
            .then_some(name.as_str())
    }
}

/// `true` iff `specification` contains an existential condition anywhere
/// in its match tree (including nested existentials). Used to validate
/// purge conditions, which spec.md §6 requires to be free of existential
/// clauses so that purge remains deterministic.
pub fn has_existential_condition(specification: &Specification) -> bool {
    matches_contain_existential(&specification.matches)
}

fn matches_contain_existential(matches: &[Match]) -> bool {
    matches
        .iter()
        .any(|m| m.conditions.iter().any(|c| matches!(c, Condition::Existential { .. })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_specification_recognized() {
        let spec = Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![],
            projection: Projection::Label("p".into()),
        };
        assert_eq!(spec.identity_given(), Some("p"));
    }

    #[test]
    fn specification_with_matches_is_not_identity() {
        let spec = Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![Match {
                unknown: Label::new("t", "Task"),
                conditions: vec![],
            }],
            projection: Projection::Label("p".into()),
        };
        assert_eq!(spec.identity_given(), None);
    }

    #[test]
    fn existential_condition_detected_even_when_nested() {
        let spec = Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![Match {
                unknown: Label::new("t", "Task"),
                conditions: vec![Condition::Existential {
                    exists: false,
                    matches: vec![Match {
                        unknown: Label::new("c", "Completed"),
                        conditions: vec![],
                    }],
                }],
            }],
            projection: Projection::Label("p".into()),
        };
        assert!(has_existential_condition(&spec));
    }

    #[test]
    fn path_only_specification_has_no_existential() {
        let spec = Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![Match {
                unknown: Label::new("t", "Task"),
                conditions: vec![Condition::Path {
                    left: Chain::label_only("t").role("project"),
                    right: Chain::label_only("p"),
                }],
            }],
            projection: Projection::Label("p".into()),
        };
        assert!(!has_existential_condition(&spec));
    }
}
