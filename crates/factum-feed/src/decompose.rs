// SPDX-License-Identifier: Apache-2.0
//! Feed decomposition (spec.md §4.6): a specification may imply more
//! than one feed — the main feed, plus one per not-exists condition,
//! observed positively.

use factum_spec::{Condition, Label, Match, Projection, Specification};

/// Decompose `specification` into its feeds: itself, plus one feed per
/// not-exists condition at the top level of its matches. Nested
/// existentials deeper than one level are not further partitioned.
#[must_use]
pub fn decompose(specification: &Specification) -> Vec<Specification> {
    let mut feeds = vec![specification.clone()];
    collect_not_exists_feeds(&specification.matches, &mut feeds);
    feeds
}

fn collect_not_exists_feeds(matches: &[Match], feeds: &mut Vec<Specification>) {
    for m in matches {
        for condition in &m.conditions {
            if let Condition::Existential {
                exists: false,
                matches: nested,
            } = condition
            {
                if let Some(inner) = nested.first() {
                    feeds.push(Specification {
                        givens: vec![Label::new(m.unknown.name.clone(), m.unknown.fact_type.clone())],
                        matches: nested.clone(),
                        projection: Projection::Label(inner.unknown.name.clone()),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_spec::Chain;

    #[test]
    fn not_exists_condition_yields_second_feed() {
        let specification = Specification {
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
        };

        let feeds = decompose(&specification);
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[1].givens[0].name, "t");
        assert_eq!(feeds[1].givens[0].fact_type, "Task");
        assert_eq!(feeds[1].projection, Projection::Label("c".into()));
    }

    #[test]
    fn specification_without_not_exists_has_one_feed() {
        let specification = Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![Match {
                unknown: Label::new("t", "Task"),
                conditions: vec![Condition::Path {
                    left: Chain::label_only("t").role("project"),
                    right: Chain::label_only("p"),
                }],
            }],
            projection: Projection::Label("t".into()),
        };
        assert_eq!(decompose(&specification).len(), 1);
    }
}
