// SPDX-License-Identifier: Apache-2.0
//! Inverse specification derivation (spec.md §4.6): for each way a new
//! fact can extend a specification's match tree, a specification that,
//! given an instance of that fact, resolves back to the affected
//! observer's root given and the changed result itself.

use factum_spec::{Chain, Condition, Label, Match, Projection, Specification};
use std::collections::HashMap;

/// Whether an inverse adds or removes a result for the observer bound to
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverseOperation {
    /// The new fact's appearance adds a result.
    Add,
    /// The new fact's appearance removes a result (a not-exists branch
    /// just became false).
    Remove,
}

/// A derived inverse: the fact type that triggers it, the specification
/// that walks back from an instance of that type to the observer's
/// given, and whether a match adds or removes a result.
#[derive(Debug, Clone, PartialEq)]
pub struct Inverse {
    /// Fact type of the newly-introduced fact.
    pub fact_type: String,
    /// Specification with a given named after the triggering match's
    /// unknown, of `fact_type`. Its projection is a composite of
    /// `"affected"` (the changed result) and `"given"` (the original
    /// specification's root binding, used to find which listeners this
    /// inverse applies to).
    pub specification: Specification,
    /// Add or remove semantics.
    pub operation: InverseOperation,
    /// The original specification's given label this inverse resolves
    /// back to.
    pub root_given: String,
}

struct Binding {
    fact_type: String,
    left: Chain,
    right: Chain,
}

/// Derive every inverse reachable from `specification`'s match tree.
#[must_use]
pub fn derive_inverses(specification: &Specification) -> Vec<Inverse> {
    let bindings = collect_bindings(specification);
    let mut inverses = Vec::new();
    walk(&specification.matches, InverseOperation::Add, None, specification, &bindings, &mut inverses);
    inverses
}

fn walk(
    matches: &[Match],
    operation: InverseOperation,
    report_label: Option<&str>,
    root: &Specification,
    bindings: &HashMap<String, Binding>,
    out: &mut Vec<Inverse>,
) {
    for m in matches {
        let report = report_label.unwrap_or(&m.unknown.name);
        if let Some((spec, root_given)) =
            invert_chain(root, bindings, &m.unknown.name, &m.unknown.fact_type, report)
        {
            out.push(Inverse {
                fact_type: m.unknown.fact_type.clone(),
                specification: spec,
                operation,
                root_given,
            });
        }
        for condition in &m.conditions {
            match condition {
                Condition::Existential { exists: false, matches: nested } => {
                    walk(nested, InverseOperation::Remove, Some(&m.unknown.name), root, bindings, out);
                }
                Condition::Existential { exists: true, matches: nested } => {
                    walk(nested, InverseOperation::Add, Some(&m.unknown.name), root, bindings, out);
                }
                Condition::Path { .. } => {}
            }
        }
    }
}

fn collect_bindings(specification: &Specification) -> HashMap<String, Binding> {
    let mut bindings = HashMap::new();
    collect_from_matches(&specification.matches, &mut bindings);
    bindings
}

fn collect_from_matches(matches: &[Match], out: &mut HashMap<String, Binding>) {
    for m in matches {
        for condition in &m.conditions {
            match condition {
                Condition::Path { left, right } if left.label == m.unknown.name => {
                    out.entry(m.unknown.name.clone()).or_insert_with(|| Binding {
                        fact_type: m.unknown.fact_type.clone(),
                        left: left.clone(),
                        right: right.clone(),
                    });
                }
                Condition::Existential { matches: nested, .. } => collect_from_matches(nested, out),
                Condition::Path { .. } => {}
            }
        }
    }
}

fn label_type(root: &Specification, bindings: &HashMap<String, Binding>, name: &str) -> Option<String> {
    if let Some(given) = root.givens.iter().find(|g| g.name == name) {
        return Some(given.fact_type.clone());
    }
    bindings.get(name).map(|b| b.fact_type.clone())
}

/// Compose single-hop inverse matches walking from a fact of `start_type`
/// (named `start_label`) back through `bindings` until a root given is
/// reached. Returns the inverse specification plus the name of the given
/// it resolved to. Returns `None` if a step's shape isn't a supported
/// single-role hop, `report_label` is never bound along the walk, or
/// `start_label` is itself a given (nothing to invert).
fn invert_chain(
    root: &Specification,
    bindings: &HashMap<String, Binding>,
    start_label: &str,
    start_type: &str,
    report_label: &str,
) -> Option<(Specification, String)> {
    if root.givens.iter().any(|g| g.name == start_label) {
        return None;
    }

    let mut matches = Vec::new();
    let mut current_name = start_label.to_string();
    let mut seen_report = current_name == report_label;

    loop {
        if root.givens.iter().any(|g| g.name == current_name) {
            break;
        }
        let binding = bindings.get(&current_name)?;
        let next_type = label_type(root, bindings, &binding.right.label)?;
        if binding.left.roles.is_empty() && binding.right.roles.len() == 1 {
            matches.push(Match {
                unknown: Label::new(binding.right.label.clone(), next_type),
                conditions: vec![Condition::Path {
                    left: Chain::label_only(binding.right.label.clone()).role(binding.right.roles[0].clone()),
                    right: Chain::label_only(current_name.clone()),
                }],
            });
        } else if binding.left.roles.len() == 1 && binding.right.roles.is_empty() {
            matches.push(Match {
                unknown: Label::new(binding.right.label.clone(), next_type),
                conditions: vec![Condition::Path {
                    left: Chain::label_only(binding.right.label.clone()),
                    right: Chain::label_only(current_name.clone()).role(binding.left.roles[0].clone()),
                }],
            });
        } else {
            return None;
        }
        current_name = binding.right.label.clone();
        if current_name == report_label {
            seen_report = true;
        }
    }

    if !seen_report {
        return None;
    }

    let given_name = current_name;
    let specification = Specification {
        givens: vec![Label::new(start_label, start_type.to_string())],
        matches,
        projection: Projection::Composite(vec![
            ("affected".to_string(), Projection::Label(report_label.to_string())),
            ("given".to_string(), Projection::Label(given_name.clone())),
        ]),
    };
    Some((specification, given_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks_under_project_not_completed() -> Specification {
        Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![Match {
                unknown: Label::new("t", "Task"),
                conditions: vec![
                    Condition::Path {
                        left: Chain::label_only("t").role("project"),
                        right: Chain::label_only("p"),
                    },
                    Condition::Existential {
                        exists: false,
                        matches: vec![Match {
                            unknown: Label::new("c", "Completed"),
                            conditions: vec![Condition::Path {
                                left: Chain::label_only("c").role("task"),
                                right: Chain::label_only("t"),
                            }],
                        }],
                    },
                ],
            }],
            projection: Projection::Label("t".into()),
        }
    }

    #[test]
    fn task_inverse_resolves_to_project_given() {
        let inverses = derive_inverses(&tasks_under_project_not_completed());
        let task_inverse = inverses
            .iter()
            .find(|i| i.fact_type == "Task" && i.operation == InverseOperation::Add)
            .unwrap();
        assert_eq!(task_inverse.root_given, "p");
        assert_eq!(task_inverse.specification.givens[0].fact_type, "Task");
    }

    #[test]
    fn completed_inverse_is_a_removal_reporting_the_outer_task() {
        let inverses = derive_inverses(&tasks_under_project_not_completed());
        let completed_inverse = inverses
            .iter()
            .find(|i| i.fact_type == "Completed")
            .unwrap();
        assert_eq!(completed_inverse.operation, InverseOperation::Remove);
        assert_eq!(completed_inverse.root_given, "p");
        assert_eq!(completed_inverse.specification.matches.len(), 2);
        assert_eq!(
            completed_inverse.specification.projection,
            Projection::Composite(vec![
                ("affected".to_string(), Projection::Label("t".into())),
                ("given".to_string(), Projection::Label("p".into())),
            ])
        );
    }
}
