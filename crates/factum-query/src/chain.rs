// SPDX-License-Identifier: Apache-2.0
//! Predecessor-chain resolution against a storage snapshot.

use crate::error::QueryError;
use crate::tuple::Tuple;
use factum_core::{FactReference, Predecessors};
use factum_spec::Chain;
use factum_storage::Snapshot;

/// Walk `chain` forward from its rooted label, one predecessor role at a
/// time. Each step reads the role's predecessor off the currently-resolved
/// fact; a role absent from the fact, or bound to more than one
/// predecessor (an array-valued role can't resolve a single-valued chain
/// step), yields `Ok(None)` — the "absent predecessor roles produce no
/// tuple" edge case (spec.md §4.5), not an error.
pub async fn resolve_forward(
    snapshot: &dyn Snapshot,
    tuple: &Tuple,
    chain: &Chain,
) -> Result<Option<FactReference>, QueryError> {
    let Some(mut current) = tuple.get(&chain.label).cloned() else {
        return Err(QueryError::UnboundLabel(chain.label.clone()));
    };
    for role in &chain.roles {
        let Some(envelope) = snapshot.get(&current).await? else {
            return Ok(None);
        };
        let Some((_, predecessors)) = envelope
            .fact
            .predecessors
            .iter()
            .find(|(name, _)| name == role)
        else {
            return Ok(None);
        };
        match predecessors {
            Predecessors::One(reference) => current = reference.clone(),
            Predecessors::Many(_) => return Ok(None),
        }
    }
    Ok(Some(current))
}
