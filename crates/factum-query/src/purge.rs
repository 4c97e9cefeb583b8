// SPDX-License-Identifier: Apache-2.0
//! Purge orchestration (spec.md §6): evaluate a purge condition against
//! each root to compute the descendant subgraph, then delegate the
//! actual removal to `factum-storage`'s low-level `delete` primitive.
//!
//! This lives here, rather than in `factum-storage`, to avoid a circular
//! crate dependency: evaluating a [`Specification`] is exactly what
//! [`crate::project::execute`] already does, and `factum-storage` cannot
//! depend on `factum-query` without `factum-query` in turn depending on
//! `factum-storage` for the [`Snapshot`] it walks.

use crate::error::QueryError;
use crate::project::{execute, Projected};
use crate::tuple::Tuple;
use factum_core::FactReference;
use factum_spec::{has_existential_condition, Specification};
use factum_storage::FactStorage;
use std::collections::HashSet;

/// Reject purge conditions containing existential clauses, which would
/// make the purged set depend on facts outside the subgraph being
/// removed (spec.md §6's registration-time validation).
pub fn validate_purge_condition(condition: &Specification) -> Result<(), QueryError> {
    if has_existential_condition(condition) {
        return Err(QueryError::NonDeterministicPurgeCondition);
    }
    Ok(())
}

/// Remove the strict descendants of `roots` matched by `condition`; the
/// roots themselves are retained. Returns the number of facts removed.
pub async fn purge_descendants(
    store: &dyn FactStorage,
    roots: &[FactReference],
    condition: &Specification,
) -> Result<usize, QueryError> {
    validate_purge_condition(condition)?;
    let mut targets: HashSet<FactReference> = HashSet::new();
    for root in roots {
        let mut givens = Tuple::new();
        if let Some(given) = condition.givens.first() {
            givens.insert(given.name.clone(), root.clone());
        }
        for projected in execute(store, condition, &givens).await? {
            collect_references(&projected, &mut targets);
        }
    }
    let references: Vec<FactReference> = targets.into_iter().collect();
    Ok(store.delete(&references).await?)
}

/// As [`purge_descendants`], but the roots are removed too.
pub async fn purge(
    store: &dyn FactStorage,
    roots: &[FactReference],
    condition: &Specification,
) -> Result<usize, QueryError> {
    let mut removed = purge_descendants(store, roots, condition).await?;
    removed += store.delete(roots).await?;
    Ok(removed)
}

fn collect_references(projected: &Projected, out: &mut HashSet<FactReference>) {
    match projected {
        Projected::Reference(reference) => {
            out.insert(reference.clone());
        }
        Projected::Composite(parts) => {
            for (_, part) in parts {
                collect_references(part, out);
            }
        }
        Projected::Collection(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        Projected::Field(_) | Projected::Hash(_) => {}
    }
}
