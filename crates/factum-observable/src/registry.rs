// SPDX-License-Identifier: Apache-2.0
//! Listener registry and batch dispatch.

use crate::notification::{Notification, NotificationKind};
use factum_core::{Envelope, FactReference};
use factum_feed::{derive_inverses, Inverse, InverseOperation};
use factum_query::{execute, Projected, Tuple};
use factum_spec::Specification;
use factum_storage::Snapshot;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::error;

/// Opaque, identity-comparable handle to a registered listener. Removal is
/// O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    root_given: String,
    given_reference: FactReference,
    inverses: Vec<Inverse>,
    sender: mpsc::Sender<Notification>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    listeners: HashMap<ListenerId, ListenerEntry>,
}

/// Registry of active observers plus the reactive dispatch that feeds them
/// from newly-persisted envelopes (spec.md §4.7).
///
/// A listener is registered against a specification together with the
/// concrete given it is bound to; its inverses are derived once, at
/// registration time, and reused for every subsequent batch.
#[derive(Default, Clone)]
pub struct ObservableSource {
    inner: Arc<Mutex<Inner>>,
}

impl ObservableSource {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `specification` bound to `root_given` ->
    /// `given_reference`. Returns the listener's id and the channel its
    /// notifications arrive on.
    pub async fn register(
        &self,
        specification: &Specification,
        root_given: impl Into<String>,
        given_reference: FactReference,
    ) -> (ListenerId, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(64);
        let entry = ListenerEntry {
            root_given: root_given.into(),
            given_reference,
            inverses: derive_inverses(specification),
            sender,
        };
        let mut inner = self.inner.lock().await;
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.insert(id, entry);
        (id, receiver)
    }

    /// Deregister a listener. A no-op if `id` is unknown or already
    /// removed.
    pub async fn remove(&self, id: ListenerId) {
        self.inner.lock().await.listeners.remove(&id);
    }

    /// Evaluate every registered listener's inverses against `envelopes`,
    /// in order, dispatching a [`Notification`] to each listener whose
    /// given matches. A listener whose channel has closed or is full is
    /// traced and skipped, not deregistered.
    pub async fn notify(&self, snapshot: &dyn Snapshot, envelopes: &[Envelope]) {
        let inner = self.inner.lock().await;
        for envelope in envelopes {
            let new_reference = envelope.fact.reference();
            for entry in inner.listeners.values() {
                for inverse in &entry.inverses {
                    if inverse.fact_type != envelope.fact.fact_type {
                        continue;
                    }
                    if inverse.root_given != entry.root_given {
                        continue;
                    }
                    match run_inverse(snapshot, inverse, &new_reference).await {
                        Ok(results) => {
                            for projected in results {
                                dispatch(entry, inverse.operation, projected);
                            }
                        }
                        Err(err) => {
                            error!(?err, fact_type = %inverse.fact_type, "inverse evaluation failed");
                        }
                    }
                }
            }
        }
    }
}

async fn run_inverse(
    snapshot: &dyn Snapshot,
    inverse: &Inverse,
    new_reference: &FactReference,
) -> Result<Vec<Projected>, factum_query::QueryError> {
    let given_name = &inverse.specification.givens[0].name;
    let mut givens = Tuple::new();
    givens.insert(given_name.clone(), new_reference.clone());
    execute(snapshot, &inverse.specification, &givens).await
}

fn dispatch(entry: &ListenerEntry, operation: InverseOperation, projected: Projected) {
    let Projected::Composite(parts) = projected else {
        return;
    };
    let affected = parts.iter().find(|(name, _)| name == "affected").map(|(_, v)| v.clone());
    let given = parts.iter().find(|(name, _)| name == "given").map(|(_, v)| v.clone());
    let (Some(affected), Some(Projected::Reference(given_ref))) = (affected, given) else {
        return;
    };
    if given_ref != entry.given_reference {
        return;
    }
    let kind = match operation {
        InverseOperation::Add => NotificationKind::Added,
        InverseOperation::Remove => NotificationKind::Removed,
    };
    if let Err(err) = entry.sender.try_send(Notification { kind, result: affected }) {
        error!(%err, "listener channel closed or full, dropping notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::{FactRecord, FieldValue, Predecessors};
    use factum_spec::{Chain, Condition, Label, Match, Projection};
    use factum_storage::{FactStorage, MemoryStore};

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

    #[tokio::test]
    async fn saving_a_matching_task_notifies_added() {
        let store = MemoryStore::new();
        let project = FactRecord::new("Project", vec![("name".into(), FieldValue::String("Acme".into()))], vec![]);
        let project_ref = project.reference();
        store.save(vec![Envelope { fact: project.clone(), signatures: vec![] }]).await.unwrap();

        let registry = ObservableSource::new();
        let spec = tasks_under_project_not_completed();
        let (_id, mut rx) = registry.register(&spec, "p", project_ref.clone()).await;

        let task = FactRecord::new(
            "Task",
            vec![],
            vec![("project".into(), Predecessors::One(project_ref))],
        );
        let task_ref = task.reference();
        let envelope = Envelope { fact: task, signatures: vec![] };
        store.save(vec![envelope.clone()]).await.unwrap();
        registry.notify(&store, &[envelope]).await;

        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.kind, NotificationKind::Added);
        assert_eq!(notification.result, Projected::Reference(task_ref));
    }

    #[tokio::test]
    async fn completing_a_task_notifies_removed_for_the_task() {
        let store = MemoryStore::new();
        let project = FactRecord::new("Project", vec![], vec![]);
        let project_ref = project.reference();
        store.save(vec![Envelope { fact: project.clone(), signatures: vec![] }]).await.unwrap();

        let task = FactRecord::new(
            "Task",
            vec![],
            vec![("project".into(), Predecessors::One(project_ref.clone()))],
        );
        let task_ref = task.reference();
        store.save(vec![Envelope { fact: task, signatures: vec![] }]).await.unwrap();

        let registry = ObservableSource::new();
        let spec = tasks_under_project_not_completed();
        let (_id, mut rx) = registry.register(&spec, "p", project_ref).await;

        let completed = FactRecord::new(
            "Completed",
            vec![],
            vec![("task".into(), Predecessors::One(task_ref.clone()))],
        );
        let envelope = Envelope { fact: completed, signatures: vec![] };
        store.save(vec![envelope.clone()]).await.unwrap();
        registry.notify(&store, &[envelope]).await;

        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.kind, NotificationKind::Removed);
        assert_eq!(notification.result, Projected::Reference(task_ref));
    }

    #[tokio::test]
    async fn removed_listener_receives_nothing() {
        let store = MemoryStore::new();
        let project = FactRecord::new("Project", vec![], vec![]);
        let project_ref = project.reference();
        store.save(vec![Envelope { fact: project.clone(), signatures: vec![] }]).await.unwrap();

        let registry = ObservableSource::new();
        let spec = tasks_under_project_not_completed();
        let (id, mut rx) = registry.register(&spec, "p", project_ref.clone()).await;
        registry.remove(id).await;

        let task = FactRecord::new(
            "Task",
            vec![],
            vec![("project".into(), Predecessors::One(project_ref))],
        );
        let envelope = Envelope { fact: task, signatures: vec![] };
        store.save(vec![envelope.clone()]).await.unwrap();
        registry.notify(&store, &[envelope]).await;

        assert!(rx.try_recv().is_err());
    }
}
