// SPDX-License-Identifier: Apache-2.0
//! [`Factum`], the top-level facade composing the fact model, query
//! evaluator, authorization and distribution engines, observable
//! registry, and replication layer into the operations an application
//! actually calls (spec.md §2's data-flow summary).

use crate::error::FactumError;
use factum_authz::{authorize, RuleSet as AuthorizationRules};
use factum_config::{FactumConfig, PurgeConditionError, PurgeRegistry};
use factum_core::{Envelope, FactReference, PublicKey};
use factum_distribution::{authorize_feed, RuleSet as DistributionRules};
use factum_fork::Fork;
use factum_observable::{ListenerId, Notification, ObservableSource};
use factum_query::{execute, purge, purge_descendants, Projected, Tuple};
use factum_spec::Specification;
use factum_storage::FactStorage;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wires one local store, one replication [`Fork`], and the
/// authorization/distribution/observation layers above them into a
/// single client-facing API.
///
/// `St` is shared between the facade (for query, authorization, and
/// observable dispatch, all of which read the store directly) and `F`
/// (which owns persistence and any outbound replication); both type
/// parameters are generic so callers can plug in whichever concrete
/// store and fork mode (`PassThrough`, `Transient`, `Persistent`) fit
/// their deployment.
pub struct Factum<F, St> {
    fork: Arc<F>,
    store: Arc<St>,
    authorization_rules: AuthorizationRules,
    distribution_rules: DistributionRules,
    observable: ObservableSource,
    purge_conditions: PurgeRegistry,
    config: FactumConfig,
}

impl<F, St> Factum<F, St>
where
    F: Fork,
    St: FactStorage,
{
    /// Build a runtime over `fork` and `store`, with no authorization or
    /// distribution rules declared yet (every write is rejected, every
    /// feed is denied, until rules are attached).
    pub fn new(fork: Arc<F>, store: Arc<St>, config: FactumConfig) -> Self {
        Self {
            fork,
            store,
            authorization_rules: AuthorizationRules::new(),
            distribution_rules: DistributionRules::new(),
            observable: ObservableSource::new(),
            purge_conditions: PurgeRegistry::new(),
            config,
        }
    }

    /// Declare the authorization rules writes are checked against.
    #[must_use]
    pub fn with_authorization_rules(mut self, rules: AuthorizationRules) -> Self {
        self.authorization_rules = rules;
        self
    }

    /// Declare the distribution rules feed subscriptions are checked
    /// against.
    #[must_use]
    pub fn with_distribution_rules(mut self, rules: DistributionRules) -> Self {
        self.distribution_rules = rules;
        self
    }

    /// The configuration this runtime was built with.
    #[must_use]
    pub fn config(&self) -> &FactumConfig {
        &self.config
    }

    /// Register a purge condition, rejecting it outright if it contains
    /// an existential clause.
    pub fn register_purge_condition(&mut self, condition: Specification) -> Result<(), PurgeConditionError> {
        self.purge_conditions.register(condition)
    }

    /// Authorize, persist, and (if the fork mode replicates) enqueue
    /// `envelopes` for transmission; notify any observer whose feed they
    /// affect. Returns only the envelopes newly persisted — an envelope
    /// already known has its signatures merged and is not included.
    ///
    /// # Errors
    ///
    /// Fails with [`FactumError::Authorization`] if any fact is
    /// rejected; the whole batch is then discarded, none of it persisted.
    pub async fn save(
        &self,
        envelopes: Vec<Envelope>,
        writer_key: Option<PublicKey>,
    ) -> Result<Vec<Envelope>, FactumError> {
        let verdicts = authorize(self.store.as_ref(), &self.authorization_rules, envelopes, writer_key).await?;
        let ordered: Vec<Envelope> = verdicts.into_iter().map(|(envelope, _)| envelope).collect();
        let newly_persisted = self.fork.save(ordered).await?;
        self.observable.notify(self.store.as_ref(), &newly_persisted).await;
        Ok(newly_persisted)
    }

    /// Evaluate `specification` against the current store contents,
    /// bound to `givens`.
    pub async fn query(&self, specification: &Specification, givens: &Tuple) -> Result<Vec<Projected>, FactumError> {
        Ok(execute(self.store.as_ref(), specification, givens).await?)
    }

    /// Register a live observer for `specification`, bound to
    /// `root_given` -> `given_reference`. The returned receiver yields a
    /// [`Notification`] each time a subsequent `save` adds or removes a
    /// matching result.
    pub async fn watch(
        &self,
        specification: &Specification,
        root_given: impl Into<String>,
        given_reference: FactReference,
    ) -> (ListenerId, mpsc::Receiver<Notification>) {
        self.observable.register(specification, root_given, given_reference).await
    }

    /// Deregister a previously registered observer.
    pub async fn unwatch(&self, id: ListenerId) {
        self.observable.remove(id).await;
    }

    /// Check whether `caller` may subscribe to `feed` bound to
    /// `feed_givens`, against the declared distribution rules.
    pub async fn authorize_feed_read(
        &self,
        feed: &Specification,
        feed_givens: &Tuple,
        caller: Option<PublicKey>,
    ) -> Result<(), FactumError> {
        Ok(authorize_feed(self.store.as_ref(), &self.distribution_rules, feed, feed_givens, caller).await?)
    }

    /// Remove the strict descendants of `roots` matched by a registered
    /// purge condition at `condition_index`. The roots themselves are
    /// retained.
    pub async fn purge_descendants(&self, roots: &[FactReference], condition_index: usize) -> Result<usize, FactumError> {
        let condition = self.purge_condition(condition_index)?;
        Ok(purge_descendants(self.store.as_ref(), roots, condition).await?)
    }

    /// As [`Self::purge_descendants`], but `roots` are removed too.
    pub async fn purge(&self, roots: &[FactReference], condition_index: usize) -> Result<usize, FactumError> {
        let condition = self.purge_condition(condition_index)?;
        Ok(purge(self.store.as_ref(), roots, condition).await?)
    }

    fn purge_condition(&self, index: usize) -> Result<&Specification, FactumError> {
        self.purge_conditions
            .conditions()
            .get(index)
            .ok_or(FactumError::UnknownPurgeCondition(index))
    }

    /// Start the fork's replication (subscription streams, queue
    /// draining), if its mode has one.
    pub async fn start(&self) -> Result<(), FactumError> {
        Ok(self.fork.start().await?)
    }

    /// Stop the fork's replication, if its mode has one.
    pub async fn stop(&self) {
        self.fork.stop().await;
    }
}
