// SPDX-License-Identifier: Apache-2.0
//! Bottom-up match evaluation (spec.md §4.5).

use crate::chain::resolve_forward;
use crate::error::QueryError;
use crate::tuple::Tuple;
use factum_spec::{Condition, Match};
use factum_storage::Snapshot;

/// Evaluate `matches` in order against `base`, returning every tuple that
/// satisfies the full chain. `base` is usually a single tuple seeded from
/// the specification's givens.
pub async fn evaluate_matches(
    snapshot: &dyn Snapshot,
    matches: &[Match],
    base: Vec<Tuple>,
) -> Result<Vec<Tuple>, QueryError> {
    let mut tuples = base;
    for m in matches {
        tuples = evaluate_match(snapshot, tuples, m).await?;
    }
    Ok(tuples)
}

async fn evaluate_match(
    snapshot: &dyn Snapshot,
    base: Vec<Tuple>,
    m: &Match,
) -> Result<Vec<Tuple>, QueryError> {
    let mut out = Vec::new();
    for tuple in base {
        for candidate in generate_candidates(snapshot, &tuple, m).await? {
            let mut extended = tuple.clone();
            extended.insert(m.unknown.name.clone(), candidate);
            if satisfies(snapshot, &extended, &m.conditions).await? {
                out.push(extended);
            }
        }
    }
    Ok(out)
}

/// Generate candidate facts for `m`'s unknown by using its first usable
/// path condition as an index lookup against the already-bound side.
/// Two edge shapes (spec.md §4.5):
/// - **successor**: `left.roles` has exactly one role — the unknown is a
///   successor of the resolved anchor under that role; looked up via the
///   inverse index.
/// - **predecessor**: `left.roles` is empty — the unknown *is* the
///   resolved anchor itself (a direct lookup, the "follow role on child
///   to parent" case, where the role walk lives entirely in `right`).
async fn generate_candidates(
    snapshot: &dyn Snapshot,
    tuple: &Tuple,
    m: &Match,
) -> Result<Vec<factum_core::FactReference>, QueryError> {
    for condition in &m.conditions {
        let Condition::Path { left, right } = condition else {
            continue;
        };
        if left.label != m.unknown.name {
            continue;
        }
        let Some(anchor) = resolve_forward(snapshot, tuple, right).await? else {
            return Ok(Vec::new());
        };
        if left.roles.is_empty() {
            return Ok(vec![anchor]);
        }
        if left.roles.len() == 1 {
            let candidates = snapshot
                .successors(&anchor, &m.unknown.fact_type, &left.roles[0])
                .await?;
            return Ok(candidates);
        }
    }
    Ok(Vec::new())
}

async fn satisfies(
    snapshot: &dyn Snapshot,
    tuple: &Tuple,
    conditions: &[Condition],
) -> Result<bool, QueryError> {
    for condition in conditions {
        match condition {
            Condition::Path { left, right } => {
                let left_resolved = resolve_forward(snapshot, tuple, left).await?;
                let right_resolved = resolve_forward(snapshot, tuple, right).await?;
                if left_resolved.is_none() || left_resolved != right_resolved {
                    return Ok(false);
                }
            }
            Condition::Existential { exists, matches } => {
                let found = !evaluate_matches(snapshot, matches, vec![tuple.clone()])
                    .await?
                    .is_empty();
                if found != *exists {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::{Envelope, FactRecord, FieldValue, Predecessors};
    use factum_spec::{Chain, Label};
    use factum_storage::{FactStorage, MemoryStore};

    async fn seed() -> (MemoryStore, factum_core::FactReference, factum_core::FactReference) {
        let store = MemoryStore::new();
        let project = FactRecord::new(
            "Project",
            vec![("name".into(), FieldValue::String("P".into()))],
            vec![],
        );
        let project_ref = project.reference();
        let task = FactRecord::new(
            "Task",
            vec![("title".into(), FieldValue::String("T".into()))],
            vec![("project".into(), Predecessors::One(project_ref.clone()))],
        );
        let task_ref = task.reference();
        store
            .save(vec![
                Envelope {
                    fact: project,
                    signatures: vec![],
                },
                Envelope {
                    fact: task,
                    signatures: vec![],
                },
            ])
            .await
            .unwrap();
        (store, project_ref, task_ref)
    }

    #[tokio::test]
    async fn single_path_condition_finds_successor() {
        let (store, project_ref, task_ref) = seed().await;
        let mut base = Tuple::new();
        base.insert("p".into(), project_ref);
        let matches = vec![Match {
            unknown: Label::new("t", "Task"),
            conditions: vec![Condition::Path {
                left: Chain::label_only("t").role("project"),
                right: Chain::label_only("p"),
            }],
        }];
        let results = evaluate_matches(&store, &matches, vec![base]).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get("t"), Some(&task_ref));
    }

    #[tokio::test]
    async fn predecessor_edge_resolves_directly() {
        let (store, project_ref, task_ref) = seed().await;
        let mut base = Tuple::new();
        base.insert("t".into(), task_ref);
        let matches = vec![Match {
            unknown: Label::new("p", "Project"),
            conditions: vec![Condition::Path {
                left: Chain::label_only("p"),
                right: Chain::label_only("t").role("project"),
            }],
        }];
        let results = evaluate_matches(&store, &matches, vec![base]).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get("p"), Some(&project_ref));
    }

    #[tokio::test]
    async fn not_exists_excludes_matched_tasks() {
        let (store, project_ref, task_ref) = seed().await;
        let completed = FactRecord::new(
            "Completed",
            vec![],
            vec![("task".into(), Predecessors::One(task_ref.clone()))],
        );
        store
            .save(vec![Envelope {
                fact: completed,
                signatures: vec![],
            }])
            .await
            .unwrap();

        let mut base = Tuple::new();
        base.insert("p".into(), project_ref);
        let matches = vec![Match {
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
        }];
        let results = evaluate_matches(&store, &matches, vec![base]).await.unwrap();
        assert!(results.is_empty());
    }
}
