// SPDX-License-Identifier: Apache-2.0
//! Scalar field values carried by a fact.

use serde::{Deserialize, Serialize};

/// A scalar field value. Facts carry untyped maps of these — the tagged
/// value tree described for dynamic fact objects, plus the `type`
/// discriminator held separately on [`crate::FactRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// UTF-8 string.
    String(String),
    /// A finite number. NaN/infinite values are rejected at construction.
    Number(f64),
    /// Boolean.
    Bool(bool),
    /// Explicit null.
    Null,
}

impl FieldValue {
    /// Canonical textual form: strings are JSON-escaped, numbers render
    /// without trailing zeros, booleans/null render literally.
    pub(crate) fn write_canonical(&self, out: &mut String) {
        match self {
            FieldValue::String(s) => {
                // serde_json's string serializer already produces a
                // correctly escaped, quoted UTF-8 string.
                if let Ok(escaped) = serde_json::to_string(s) {
                    out.push_str(&escaped);
                }
            }
            FieldValue::Number(n) => {
                debug_assert!(n.is_finite(), "non-finite numbers must be rejected earlier");
                out.push_str(&format_number(*n));
            }
            FieldValue::Bool(true) => out.push_str("true"),
            FieldValue::Bool(false) => out.push_str("false"),
            FieldValue::Null => out.push_str("null"),
        }
    }
}

/// Render a finite `f64` without trailing zeros: `1.0` becomes `1`, `2.50`
/// becomes `2.5`. Rust's own `Display` for `f64` already yields the
/// shortest round-tripping decimal, which happens to satisfy this.
fn format_number(n: f64) -> String {
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_float_has_no_trailing_zero() {
        let mut out = String::new();
        FieldValue::Number(4.0).write_canonical(&mut out);
        assert_eq!(out, "4");
    }

    #[test]
    fn fractional_float_trims_trailing_zero() {
        let mut out = String::new();
        FieldValue::Number(2.50).write_canonical(&mut out);
        assert_eq!(out, "2.5");
    }

    #[test]
    fn string_is_json_escaped() {
        let mut out = String::new();
        FieldValue::String("a\"b".to_string()).write_canonical(&mut out);
        assert_eq!(out, "\"a\\\"b\"");
    }
}
