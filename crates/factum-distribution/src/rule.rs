// SPDX-License-Identifier: Apache-2.0
//! Declared distribution rules.

use factum_spec::Specification;

/// A single distribution rule: a feed shape, and who may subscribe to
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRule {
    /// The feed shape this rule grants access to.
    pub feed: Specification,
    /// If present, a specification (bound to the feed's permuted
    /// givens) whose results are the authorized principals' public
    /// keys. Absent means everyone is authorized.
    pub user_specification: Option<Specification>,
}

impl DistributionRule {
    /// A rule granting `feed` to everyone.
    #[must_use]
    pub fn everyone(feed: Specification) -> Self {
        Self { feed, user_specification: None }
    }

    /// A rule granting `feed` only to principals matched by
    /// `user_specification`.
    #[must_use]
    pub fn restricted(feed: Specification, user_specification: Specification) -> Self {
        Self { feed, user_specification: Some(user_specification) }
    }
}

/// An ordered collection of declared distribution rules. Rules are tried
/// in declaration order; the first to authorize wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<DistributionRule>,
}

impl RuleSet {
    /// An empty rule set — no feed is distributable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: DistributionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// All declared rules, in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[DistributionRule] {
        &self.rules
    }
}
