// SPDX-License-Identifier: Apache-2.0
//! Deterministic byte form used for hashing and signing.
//!
//! Grounded on the same shape as `echo-graph::RenderGraph::to_canonical_bytes`
//! (sort, then serialize) generalized from a single sorted struct to a
//! recursively key-sorted JSON object, in the style of a canonical-JSON
//! writer: compact output, object keys sorted lexicographically at every
//! level, arrays kept in their (already-sorted) element order.
//!
//! The fact's `type` is deliberately excluded from the hashed bytes — only
//! `fields` and `predecessors` are hashed, matching the documented hash
//! vectors in spec.md §8 (S1/S2). Type is still part of a fact's identity
//! (see [`FactReference`]), it just isn't part of what gets hashed.

use crate::record::Predecessors;
use crate::reference::FactReference;
use crate::value::FieldValue;

/// Compute the canonical byte form of `(fields, predecessors)` for a fact.
/// Keys are sorted lexicographically at every level; array-valued
/// predecessor roles are canonicalized as sorted-unique sets.
pub fn canonical_bytes(fields: &[(String, FieldValue)], predecessors: &[(String, Predecessors)]) -> Vec<u8> {
    let mut out = String::new();
    out.push('{');

    // Top-level keys in sorted order: "fields", "predecessors".
    out.push_str("\"fields\":");
    write_fields(fields, &mut out);
    out.push(',');

    out.push_str("\"predecessors\":");
    write_predecessors(predecessors, &mut out);

    out.push('}');
    out.into_bytes()
}

fn write_fields(fields: &[(String, FieldValue)], out: &mut String) {
    let mut sorted: Vec<&(String, FieldValue)> = fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    out.push('{');
    for (i, (key, value)) in sorted.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, out);
        out.push(':');
        value.write_canonical(out);
    }
    out.push('}');
}

fn write_predecessors(predecessors: &[(String, Predecessors)], out: &mut String) {
    let mut sorted: Vec<&(String, Predecessors)> = predecessors.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    out.push('{');
    for (i, (role, value)) in sorted.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(role, out);
        out.push(':');
        match value {
            Predecessors::One(reference) => write_reference(reference, out),
            Predecessors::Many(_) => {
                let set = value.canonical_set();
                out.push('[');
                for (j, reference) in set.iter().enumerate() {
                    if j > 0 {
                        out.push(',');
                    }
                    write_reference(reference, out);
                }
                out.push(']');
            }
        }
    }
    out.push('}');
}

fn write_reference(reference: &FactReference, out: &mut String) {
    // Keys sorted: "hash" < "type".
    out.push('{');
    out.push_str("\"hash\":");
    write_string(&reference.hash.to_base64(), out);
    out.push(',');
    out.push_str("\"type\":");
    write_string(&reference.fact_type, out);
    out.push('}');
}

fn write_string(s: &str, out: &mut String) {
    if let Ok(escaped) = serde_json::to_string(s) {
        out.push_str(&escaped);
    }
}
