// SPDX-License-Identifier: Apache-2.0
//! Declared authorization rules: a mapping from fact type to policy.

use factum_spec::Specification;
use std::collections::HashMap;

/// A policy for one fact type.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorizationRule {
    /// Any writer is accepted, no key check.
    Everyone,
    /// A specification producing the authorized population for an
    /// instance of the type. Its sole given is bound to the candidate
    /// fact's own reference; results whose projection is a `Field` of
    /// type `FieldValue::String` (or a `Composite` containing one named
    /// `"publicKey"`) are parsed as base64-encoded public keys.
    Specification(Specification),
}

/// Application-declared rules, by fact type. A type with no entry has an
/// authorized population of `None` — every write to it is rejected.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, AuthorizationRule>,
}

impl RuleSet {
    /// An empty rule set — every fact type is rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `rule` for `fact_type`, replacing any prior rule for it.
    #[must_use]
    pub fn with_rule(mut self, fact_type: impl Into<String>, rule: AuthorizationRule) -> Self {
        self.rules.insert(fact_type.into(), rule);
        self
    }

    /// The declared rule for `fact_type`, if any.
    #[must_use]
    pub fn rule_for(&self, fact_type: &str) -> Option<&AuthorizationRule> {
        self.rules.get(fact_type)
    }
}
