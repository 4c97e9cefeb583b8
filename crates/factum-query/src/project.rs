// SPDX-License-Identifier: Apache-2.0
//! Projection: turning bound tuples into result values (spec.md §4.5).

use crate::error::QueryError;
use crate::evaluate::evaluate_matches;
use crate::tuple::Tuple;
use factum_core::FieldValue;
use factum_spec::{Projection, Specification};
use factum_storage::Snapshot;

/// A projected result value. Mirrors [`Projection`]'s shape one level at a
/// time: a reference, a scalar field, a hash string, a named composite, or
/// a flattened nested-specification sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    /// A fact reference bound to a label.
    Reference(factum_core::FactReference),
    /// A scalar field value.
    Field(FieldValue),
    /// A base64 content hash.
    Hash(String),
    /// A named mapping of sub-projections, in declaration order.
    Composite(Vec<(String, Projected)>),
    /// Results of a nested specification, flattened.
    Collection(Vec<Projected>),
}

/// Run a whole specification against `snapshot`, bound to `givens`.
/// Honors the identity fast path (spec.md §4.4): no matches, projection a
/// direct given reference.
pub async fn execute(
    snapshot: &dyn Snapshot,
    specification: &Specification,
    givens: &Tuple,
) -> Result<Vec<Projected>, QueryError> {
    if let Some(name) = specification.identity_given() {
        let reference = givens
            .get(name)
            .ok_or_else(|| QueryError::UnboundLabel(name.to_string()))?;
        return Ok(vec![Projected::Reference(reference.clone())]);
    }

    let tuples = evaluate_matches(snapshot, &specification.matches, vec![givens.clone()]).await?;
    let mut results = Vec::with_capacity(tuples.len());
    for tuple in &tuples {
        results.push(Box::pin(project(snapshot, tuple, &specification.projection)).await?);
    }
    Ok(results)
}

fn project<'a>(
    snapshot: &'a dyn Snapshot,
    tuple: &'a Tuple,
    projection: &'a Projection,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Projected, QueryError>> + 'a>> {
    Box::pin(async move {
        match projection {
            Projection::Label(label) => {
                let reference = tuple
                    .get(label)
                    .ok_or_else(|| QueryError::UnboundLabel(label.clone()))?;
                Ok(Projected::Reference(reference.clone()))
            }
            Projection::Hash(label) => {
                let reference = tuple
                    .get(label)
                    .ok_or_else(|| QueryError::UnboundLabel(label.clone()))?;
                Ok(Projected::Hash(reference.hash.to_base64()))
            }
            Projection::Field { label, field } => {
                let reference = tuple
                    .get(label)
                    .ok_or_else(|| QueryError::UnboundLabel(label.clone()))?;
                let envelope = snapshot
                    .get(reference)
                    .await?
                    .ok_or_else(|| QueryError::UnboundLabel(label.clone()))?;
                let value = envelope
                    .fact
                    .fields
                    .iter()
                    .find(|(name, _)| name == field)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| {
                        QueryError::MissingField(envelope.fact.fact_type.clone(), field.clone())
                    })?;
                Ok(Projected::Field(value))
            }
            Projection::Composite(parts) => {
                let mut out = Vec::with_capacity(parts.len());
                for (name, sub) in parts {
                    out.push((name.clone(), project(snapshot, tuple, sub).await?));
                }
                Ok(Projected::Composite(out))
            }
            Projection::Collection(nested) => {
                let results = execute(snapshot, nested, tuple).await?;
                Ok(Projected::Collection(results))
            }
        }
    })
}
