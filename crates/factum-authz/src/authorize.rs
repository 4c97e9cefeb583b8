// SPDX-License-Identifier: Apache-2.0
//! Batch authorization (spec.md §4.8).

use crate::error::AuthzError;
use crate::rule::{AuthorizationRule, RuleSet};
use factum_core::{Envelope, FactReference, FieldValue, PublicKey};
use factum_query::{execute, Projected, Tuple};
use factum_storage::Snapshot;
use std::collections::{HashMap, HashSet};

/// The outcome of authorizing a single fact within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Already present in storage; signatures merge, no policy check.
    Existing,
    /// Accepted under the type's authorization rule.
    Accept,
    /// Rejected: bad hash, a rejected predecessor, or no writer key in
    /// the authorized population.
    Reject,
}

/// Authorize `envelopes` as a batch: topologically order them, then
/// compute each one's [`Verdict`] in order so that a predecessor's
/// rejection can propagate to its successors within the same batch.
///
/// `writer_key` is the submitting principal's own key, added to the
/// candidate set alongside each envelope's signatures.
///
/// # Errors
///
/// Returns [`AuthzError::Forbidden`] naming every rejected fact type if
/// any verdict is [`Verdict::Reject`]; the batch is all-or-nothing.
pub async fn authorize(
    snapshot: &dyn Snapshot,
    rules: &RuleSet,
    envelopes: Vec<Envelope>,
    writer_key: Option<PublicKey>,
) -> Result<Vec<(Envelope, Verdict)>, AuthzError> {
    let mut by_reference: HashMap<FactReference, Envelope> = envelopes
        .into_iter()
        .map(|e| (e.fact.reference(), e))
        .collect();
    let records = by_reference.values().map(|e| e.fact.clone()).collect();
    let ordered = factum_topo::sort(records)?;

    let mut rejected: HashSet<FactReference> = HashSet::new();
    let mut results = Vec::with_capacity(ordered.len());

    for record in ordered {
        let reference = record.reference();
        let Some(envelope) = by_reference.remove(&reference) else {
            continue;
        };

        let verdict = if snapshot.get(&reference).await?.is_some() {
            Verdict::Existing
        } else if !envelope.fact.is_hash_valid() {
            Verdict::Reject
        } else if record
            .predecessor_references()
            .into_iter()
            .any(|p| rejected.contains(p))
        {
            Verdict::Reject
        } else {
            decide(snapshot, rules, &envelope, &reference, writer_key).await?
        };

        if verdict == Verdict::Reject {
            rejected.insert(reference);
        }
        results.push((envelope, verdict));
    }

    let rejected_types: Vec<String> = results
        .iter()
        .filter(|(_, v)| *v == Verdict::Reject)
        .map(|(e, _)| e.fact.fact_type.clone())
        .collect();
    if !rejected_types.is_empty() {
        return Err(AuthzError::Forbidden(rejected_types));
    }
    Ok(results)
}

async fn decide(
    snapshot: &dyn Snapshot,
    rules: &RuleSet,
    envelope: &Envelope,
    reference: &FactReference,
    writer_key: Option<PublicKey>,
) -> Result<Verdict, AuthzError> {
    let Some(rule) = rules.rule_for(&envelope.fact.fact_type) else {
        return Ok(Verdict::Reject);
    };
    match rule {
        AuthorizationRule::Everyone => Ok(Verdict::Accept),
        AuthorizationRule::Specification(specification) => {
            let population = authorized_population(snapshot, specification, reference).await?;
            if population.is_empty() {
                return Ok(Verdict::Reject);
            }
            let candidates = candidate_keys(envelope, writer_key);
            if candidates.iter().any(|k| population.contains(k)) {
                Ok(Verdict::Accept)
            } else {
                Ok(Verdict::Reject)
            }
        }
    }
}

fn candidate_keys(envelope: &Envelope, writer_key: Option<PublicKey>) -> HashSet<PublicKey> {
    let mut keys: HashSet<PublicKey> = envelope.signatures.iter().map(|s| s.public_key).collect();
    if let Some(writer_key) = writer_key {
        keys.insert(writer_key);
    }
    keys
}

async fn authorized_population(
    snapshot: &dyn Snapshot,
    specification: &factum_spec::Specification,
    reference: &FactReference,
) -> Result<HashSet<PublicKey>, AuthzError> {
    let Some(given) = specification.givens.first() else {
        return Ok(HashSet::new());
    };
    let mut givens = Tuple::new();
    givens.insert(given.name.clone(), reference.clone());
    let results = execute(snapshot, specification, &givens).await?;
    Ok(results.iter().filter_map(extract_key).collect())
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
    use factum_core::{FactRecord, Predecessors};
    use factum_spec::{Label, Projection, Specification};
    use factum_storage::MemoryStore;

    fn signer_key(seed: u8) -> PublicKey {
        PublicKey([seed; 32])
    }

    #[tokio::test]
    async fn everyone_rule_accepts_any_writer() {
        let store = MemoryStore::new();
        let rules = RuleSet::new().with_rule("Comment", AuthorizationRule::Everyone);
        let fact = FactRecord::new("Comment", vec![], vec![]);
        let envelope = Envelope { fact, signatures: vec![] };
        let results = authorize(&store, &rules, vec![envelope], None).await.unwrap();
        assert_eq!(results[0].1, Verdict::Accept);
    }

    #[tokio::test]
    async fn undeclared_type_is_rejected() {
        let store = MemoryStore::new();
        let rules = RuleSet::new();
        let fact = FactRecord::new("Secret", vec![], vec![]);
        let envelope = Envelope { fact, signatures: vec![] };
        let err = authorize(&store, &rules, vec![envelope], None).await.unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden(types) if types == vec!["Secret".to_string()]));
    }

    #[tokio::test]
    async fn specification_rule_accepts_matching_writer_key() {
        let store = MemoryStore::new();
        let owner_key = signer_key(7);
        let project = FactRecord::new(
            "Project",
            vec![("ownerKey".into(), FieldValue::String(owner_key.to_base64()))],
            vec![],
        );
        let project_ref = project.reference();
        let rule_spec = Specification {
            givens: vec![Label::new("t", "Task")],
            matches: vec![project_match()],
            projection: Projection::Field { label: "p".into(), field: "ownerKey".into() },
        };
        let rules = RuleSet::new().with_rule("Task", AuthorizationRule::Specification(rule_spec));

        use factum_storage::FactStorage;
        store.save(vec![Envelope { fact: project, signatures: vec![] }]).await.unwrap();

        let task = FactRecord::new(
            "Task",
            vec![],
            vec![("project".into(), Predecessors::One(project_ref))],
        );
        let envelope = Envelope {
            fact: task,
            signatures: vec![factum_core::Signature {
                public_key: owner_key,
                signature: factum_core::SignatureBytes([0u8; 64]),
            }],
        };
        let results = authorize(&store, &rules, vec![envelope], None).await.unwrap();
        assert_eq!(results[0].1, Verdict::Accept);
    }

    fn project_match() -> factum_spec::Match {
        use factum_spec::{Chain, Condition};
        factum_spec::Match {
            unknown: Label::new("p", "Project"),
            conditions: vec![Condition::Path {
                left: Chain::label_only("t").role("project"),
                right: Chain::label_only("p"),
            }],
        }
    }
}
