// SPDX-License-Identifier: Apache-2.0
//! In-memory reference [`FactStorage`] implementation.
//!
//! Grounded on `echo-cas::MemoryTier`: a `HashMap` keyed by content
//! identity guarded by a single lock, generalized from byte blobs to
//! fact envelopes and from a flat keyspace to one that also maintains a
//! successor (inverse predecessor) index for the query evaluator.

use crate::error::StorageError;
use crate::{FactStorage, Snapshot, Timestamp};
use async_trait::async_trait;
use factum_core::{Envelope, FactReference};
use factum_topo::sort;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    envelopes: HashMap<FactReference, Envelope>,
    // (predecessor, successor type, role) -> successor references.
    successors: HashMap<(FactReference, String, String), HashSet<FactReference>>,
    mru_dates: HashMap<String, Timestamp>,
}

/// An in-memory, single-process [`FactStorage`]. Sufficient for tests and
/// for the `PassThrough` fork mode; disk/relational backends are external
/// collaborators (spec.md §1).
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn index_successors(inner: &mut Inner, envelope: &Envelope) {
        let successor_ref = envelope.fact.reference();
        let successor_type = envelope.fact.fact_type.clone();
        for (role, predecessors) in &envelope.fact.predecessors {
            for predecessor in predecessors.references() {
                inner
                    .successors
                    .entry((predecessor.clone(), successor_type.clone(), role.clone()))
                    .or_default()
                    .insert(successor_ref.clone());
            }
        }
    }
}

#[async_trait]
impl Snapshot for MemoryStore {
    async fn get(&self, reference: &FactReference) -> Result<Option<Envelope>, StorageError> {
        Ok(self.inner.read().await.envelopes.get(reference).cloned())
    }

    async fn successors(
        &self,
        reference: &FactReference,
        successor_type: &str,
        role: &str,
    ) -> Result<Vec<FactReference>, StorageError> {
        let key = (reference.clone(), successor_type.to_string(), role.to_string());
        let inner = self.inner.read().await;
        Ok(inner
            .successors
            .get(&key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl FactStorage for MemoryStore {
    async fn save(&self, envelopes: Vec<Envelope>) -> Result<Vec<Envelope>, StorageError> {
        let records = envelopes.iter().map(|e| e.fact.clone()).collect();
        let sorted_facts = sort(records)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let mut by_hash: HashMap<FactReference, Envelope> = envelopes
            .into_iter()
            .map(|e| (e.fact.reference(), e))
            .collect();

        let mut inner = self.inner.write().await;
        let mut newly_persisted = Vec::new();
        for fact in sorted_facts {
            let reference = fact.reference();
            let Some(envelope) = by_hash.remove(&reference) else {
                continue;
            };
            for predecessor in fact.predecessor_references() {
                if !inner.envelopes.contains_key(predecessor) {
                    return Err(StorageError::PredecessorMissing(predecessor.clone()));
                }
            }
            match inner.envelopes.get_mut(&reference) {
                Some(existing) => {
                    existing.merge_signatures(&envelope);
                }
                None => {
                    Self::index_successors(&mut inner, &envelope);
                    inner.envelopes.insert(reference, envelope.clone());
                    newly_persisted.push(envelope);
                }
            }
        }
        Ok(newly_persisted)
    }

    async fn which_exist(
        &self,
        references: &[FactReference],
    ) -> Result<Vec<FactReference>, StorageError> {
        let inner = self.inner.read().await;
        Ok(references
            .iter()
            .filter(|r| inner.envelopes.contains_key(*r))
            .cloned()
            .collect())
    }

    async fn load(&self, references: &[FactReference]) -> Result<Vec<Envelope>, StorageError> {
        let inner = self.inner.read().await;
        let mut stack: Vec<FactReference> = references.to_vec();
        let mut seen: HashSet<FactReference> = HashSet::new();
        let mut out = Vec::new();
        while let Some(reference) = stack.pop() {
            if !seen.insert(reference.clone()) {
                continue;
            }
            let Some(envelope) = inner.envelopes.get(&reference) else {
                return Err(StorageError::NotFound(reference));
            };
            for predecessor in envelope.fact.predecessor_references() {
                stack.push(predecessor.clone());
            }
            out.push(envelope.clone());
        }
        Ok(out)
    }

    async fn mru_date(&self, spec_hash: &str) -> Result<Option<Timestamp>, StorageError> {
        Ok(self.inner.read().await.mru_dates.get(spec_hash).copied())
    }

    async fn set_mru_date(&self, spec_hash: &str, at: Timestamp) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .mru_dates
            .insert(spec_hash.to_string(), at);
        Ok(())
    }

    async fn delete(&self, references: &[FactReference]) -> Result<usize, StorageError> {
        let mut inner = self.inner.write().await;
        let mut removed = 0;
        for reference in references {
            if inner.envelopes.remove(reference).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::FieldValue;

    fn envelope(fact_type: &str, id: &str) -> Envelope {
        let fact = factum_core::FactRecord::new(
            fact_type,
            vec![("id".into(), FieldValue::String(id.into()))],
            vec![],
        );
        Envelope {
            fact,
            signatures: vec![],
        }
    }

    #[tokio::test]
    async fn save_then_get_round_trip() {
        let store = MemoryStore::new();
        let envelope = envelope("T", "a");
        let reference = envelope.fact.reference();
        let saved = store.save(vec![envelope]).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert!(store.get(&reference).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_save_is_idempotent() {
        let store = MemoryStore::new();
        let envelope = envelope("T", "a");
        store.save(vec![envelope.clone()]).await.unwrap();
        let second = store.save(vec![envelope]).await.unwrap();
        assert_eq!(second.len(), 0);
    }

    #[tokio::test]
    async fn save_rejects_missing_predecessor() {
        let store = MemoryStore::new();
        let dangling = factum_core::FactReference::new("Ghost", factum_core::FactHash([3; 64]));
        let child = factum_core::FactRecord::new(
            "Child",
            vec![],
            vec![(
                "parent".into(),
                factum_core::Predecessors::One(dangling),
            )],
        );
        let result = store
            .save(vec![Envelope {
                fact: child,
                signatures: vec![],
            }])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn load_returns_ancestor_closure() {
        let store = MemoryStore::new();
        let parent = envelope("Parent", "p");
        let parent_ref = parent.fact.reference();
        let child_fact = factum_core::FactRecord::new(
            "Child",
            vec![],
            vec![(
                "parent".into(),
                factum_core::Predecessors::One(parent_ref.clone()),
            )],
        );
        let child_ref = child_fact.reference();
        let child = Envelope {
            fact: child_fact,
            signatures: vec![],
        };
        store.save(vec![parent, child]).await.unwrap();

        let loaded = store.load(&[child_ref]).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().any(|e| e.fact.reference() == parent_ref));
    }

    #[tokio::test]
    async fn successors_index_tracks_role() {
        let store = MemoryStore::new();
        let parent = envelope("Parent", "p");
        let parent_ref = parent.fact.reference();
        let child_fact = factum_core::FactRecord::new(
            "Child",
            vec![],
            vec![(
                "parent".into(),
                factum_core::Predecessors::One(parent_ref.clone()),
            )],
        );
        let child_ref = child_fact.reference();
        let child = Envelope {
            fact: child_fact,
            signatures: vec![],
        };
        store.save(vec![parent, child]).await.unwrap();

        let found = store
            .successors(&parent_ref, "Child", "parent")
            .await
            .unwrap();
        assert_eq!(found, vec![child_ref]);
    }

    #[tokio::test]
    async fn delete_removes_fact() {
        let store = MemoryStore::new();
        let envelope = envelope("T", "a");
        let reference = envelope.fact.reference();
        store.save(vec![envelope]).await.unwrap();
        let removed = store.delete(&[reference.clone()]).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(&reference).await.unwrap().is_none());
    }
}
