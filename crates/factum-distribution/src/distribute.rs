// SPDX-License-Identifier: Apache-2.0
//! Feed-to-rule distribution matching (spec.md §4.9).

use crate::error::{DistributionDenied, DistributionError};
use crate::rule::{DistributionRule, RuleSet};
use factum_core::{FieldValue, PublicKey};
use factum_feed::{equivalent, skeleton_of};
use factum_query::{execute, Projected, Tuple};
use factum_spec::Specification;
use factum_storage::Snapshot;

/// Check whether `caller` may subscribe to `feed` bound to `feed_givens`,
/// against every rule in `rules`, in declaration order.
///
/// # Errors
///
/// Returns [`DistributionError::Denied`] with one reason per rule tried
/// if none authorizes the feed. Returns [`DistributionError::Query`] if
/// evaluating a rule's user specification fails outright (rather than
/// simply not matching the caller).
pub async fn authorize_feed(
    snapshot: &dyn Snapshot,
    rules: &RuleSet,
    feed: &Specification,
    feed_givens: &Tuple,
    caller: Option<PublicKey>,
) -> Result<(), DistributionError> {
    let target_skeleton = skeleton_of(feed);
    let mut reasons = Vec::new();

    for (index, rule) in rules.rules().iter().enumerate() {
        if rule.feed.givens.len() != feed.givens.len() {
            reasons.push(format!("rule {index}: given count does not match"));
            continue;
        }
        if !equivalent(&skeleton_of(&rule.feed), &target_skeleton) {
            reasons.push(format!("rule {index}: feed shape does not match"));
            continue;
        }

        let mut matched_any_permutation = false;
        let mut permutation_denied = false;
        for permutation in permutations(rule.feed.givens.len()) {
            if !types_align(rule, feed, &permutation) {
                continue;
            }
            matched_any_permutation = true;
            let bound = bind_permuted(rule, feed, feed_givens, &permutation);

            match &rule.user_specification {
                None => return Ok(()),
                Some(user_spec) => {
                    let results = execute(snapshot, user_spec, &bound).await?;
                    if let Some(caller) = caller {
                        if results.iter().any(|p| extract_key(p) == Some(caller)) {
                            return Ok(());
                        }
                    }
                    permutation_denied = true;
                }
            }
        }

        if !matched_any_permutation {
            reasons.push(format!("rule {index}: no type-preserving given permutation"));
        } else if permutation_denied {
            reasons.push(format!("rule {index}: caller not in authorized population"));
        }
    }

    Err(DistributionError::Denied(DistributionDenied { reasons }))
}

/// All permutations of `0..n`, as index sequences. `n` is expected to be
/// small (a specification's given count); this is a plain recursive
/// generator, not a combinatorics library.
fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut indices: Vec<usize> = (0..n).collect();
    let mut results = Vec::new();
    permute(&mut indices, 0, &mut results);
    results
}

fn permute(indices: &mut Vec<usize>, k: usize, out: &mut Vec<Vec<usize>>) {
    if k == indices.len() {
        out.push(indices.clone());
        return;
    }
    for i in k..indices.len() {
        indices.swap(k, i);
        permute(indices, k + 1, out);
        indices.swap(k, i);
    }
}

/// `true` iff, under `permutation` (rule given index -> feed given
/// index), every rule given's type matches its permuted feed
/// counterpart's type.
fn types_align(rule: &DistributionRule, feed: &Specification, permutation: &[usize]) -> bool {
    rule.feed
        .givens
        .iter()
        .zip(permutation.iter())
        .all(|(rule_given, &feed_index)| rule_given.fact_type == feed.givens[feed_index].fact_type)
}

/// Build the tuple the rule's user specification is evaluated with:
/// rule given names bound to the concrete references `feed_givens` holds
/// for the permuted feed given.
fn bind_permuted(
    rule: &DistributionRule,
    feed: &Specification,
    feed_givens: &Tuple,
    permutation: &[usize],
) -> Tuple {
    let mut bound = Tuple::new();
    for (rule_given, &feed_index) in rule.feed.givens.iter().zip(permutation.iter()) {
        let feed_given_name = &feed.givens[feed_index].name;
        if let Some(reference) = feed_givens.get(feed_given_name) {
            bound.insert(rule_given.name.clone(), reference.clone());
        }
    }
    bound
}

fn extract_key(projected: &Projected) -> Option<PublicKey> {
    match projected {
        Projected::Field(FieldValue::String(s)) => PublicKey::from_base64(s),
        Projected::Composite(parts) => parts
            .iter()
            .find(|(name, _)| name == "publicKey")
            .and_then(|(_, value)| extract_key(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::FactRecord;
    use factum_spec::{Chain, Condition, Label, Match, Projection};
    use factum_storage::{FactStorage, MemoryStore};

    fn tasks_feed() -> Specification {
        Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![Match {
                unknown: Label::new("t", "Task"),
                conditions: vec![Condition::Path {
                    left: Chain::label_only("t").role("project"),
                    right: Chain::label_only("p"),
                }],
            }],
            projection: Projection::Label("t".into()),
        }
    }

    #[tokio::test]
    async fn everyone_rule_authorizes_matching_feed() {
        let store = MemoryStore::new();
        let project = FactRecord::new("Project", vec![], vec![]);
        let project_ref = project.reference();
        let mut givens = Tuple::new();
        givens.insert("p".into(), project_ref);

        let rules = RuleSet::new().with_rule(DistributionRule::everyone(tasks_feed()));
        authorize_feed(&store, &rules, &tasks_feed(), &givens, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_matching_rule_is_denied_with_reason() {
        let store = MemoryStore::new();
        let project = FactRecord::new("Project", vec![], vec![]);
        let project_ref = project.reference();
        let mut givens = Tuple::new();
        givens.insert("p".into(), project_ref);

        let rules = RuleSet::new();
        let err = authorize_feed(&store, &rules, &tasks_feed(), &givens, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DistributionError::Denied(_)));
    }

    #[tokio::test]
    async fn restricted_rule_authorizes_only_matching_caller() {
        let store = MemoryStore::new();
        let owner_key = PublicKey([3u8; 32]);
        let project = FactRecord::new(
            "Project",
            vec![("ownerKey".into(), FieldValue::String(owner_key.to_base64()))],
            vec![],
        );
        let project_ref = project.reference();
        store
            .save(vec![factum_core::Envelope { fact: project, signatures: vec![] }])
            .await
            .unwrap();

        let owners_spec = Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![],
            projection: Projection::Field { label: "p".into(), field: "ownerKey".into() },
        };
        let rule = DistributionRule::restricted(tasks_feed(), owners_spec);
        let rules = RuleSet::new().with_rule(rule);

        let mut givens = Tuple::new();
        givens.insert("p".into(), project_ref);

        authorize_feed(&store, &rules, &tasks_feed(), &givens, Some(owner_key))
            .await
            .unwrap();

        let stranger = PublicKey([9u8; 32]);
        let err = authorize_feed(&store, &rules, &tasks_feed(), &givens, Some(stranger))
            .await
            .unwrap_err();
        assert!(matches!(err, DistributionError::Denied(_)));
    }
}
