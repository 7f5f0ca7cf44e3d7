//! Per-group rotation decision.

use serde::{Deserialize, Serialize};

use super::grouper::GroupEntry;

/// Non-fatal notice produced while planning a rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The group holds no more images than the retention count.
    TooFewImages {
        instance_key: String,
        count: usize,
        copies: usize,
    },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewImages {
                instance_key,
                copies,
                ..
            } => write!(
                f,
                "There's less than {} images for {}. Skipping rotation.",
                copies, instance_key
            ),
        }
    }
}

/// Outcome of evaluating one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Leave the group untouched.
    Skip(Advisory),
    /// Delete this single entry.
    Delete(&'a GroupEntry),
}

/// Decide what to rotate out of one group.
///
/// At most one image is selected per call, however far the group exceeds
/// `copies`; groups converge to the retention count over successive runs.
/// The oldest entry is the minimum ordering key under plain string
/// comparison, with the earliest listed entry winning ties.
pub fn select_for_rotation<'a>(
    instance_key: &str,
    group: &'a [GroupEntry],
    copies: usize,
) -> Selection<'a> {
    if group.len() <= copies {
        return Selection::Skip(Advisory::TooFewImages {
            instance_key: instance_key.to_string(),
            count: group.len(),
            copies,
        });
    }

    let mut oldest = &group[0];
    for entry in &group[1..] {
        if entry.ordering_key < oldest.ordering_key {
            oldest = entry;
        }
    }
    Selection::Delete(oldest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<GroupEntry> {
        pairs
            .iter()
            .map(|(ts, id)| GroupEntry {
                ordering_key: ts.to_string(),
                image_id: id.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_under_threshold_skipped() {
        let group = entries(&[("100", "A"), ("200", "B"), ("300", "C")]);
        match select_for_rotation("web01", &group, 3) {
            Selection::Skip(advisory) => {
                assert_eq!(
                    advisory,
                    Advisory::TooFewImages {
                        instance_key: "web01".into(),
                        count: 3,
                        copies: 3,
                    }
                );
                assert_eq!(
                    advisory.to_string(),
                    "There's less than 3 images for web01. Skipping rotation."
                );
            }
            other => panic!("Expected Skip, got {:?}", other),
        }
    }

    #[test]
    fn test_selects_single_oldest() {
        let group = entries(&[("300", "C"), ("100", "A"), ("400", "D"), ("200", "B")]);
        assert_eq!(
            select_for_rotation("web01", &group, 3),
            Selection::Delete(&group[1])
        );
    }

    #[test]
    fn test_one_deletion_even_when_far_over() {
        let group = entries(&[
            ("1", "a"),
            ("2", "b"),
            ("3", "c"),
            ("4", "d"),
            ("5", "e"),
            ("6", "f"),
            ("7", "g"),
            ("8", "h"),
            ("9", "i"),
            ("0", "j"),
        ]);
        match select_for_rotation("big", &group, 3) {
            Selection::Delete(entry) => assert_eq!(entry.image_id, "j"),
            other => panic!("Expected Delete, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let group = entries(&[("100", "first"), ("100", "second"), ("200", "C")]);
        match select_for_rotation("web01", &group, 2) {
            Selection::Delete(entry) => assert_eq!(entry.image_id, "first"),
            other => panic!("Expected Delete, got {:?}", other),
        }
    }

    #[test]
    fn test_string_comparison_not_numeric() {
        // "99" sorts after "100" as strings, so "100" is picked.
        let group = entries(&[("99", "old"), ("100", "new")]);
        match select_for_rotation("web01", &group, 1) {
            Selection::Delete(entry) => assert_eq!(entry.image_id, "new"),
            other => panic!("Expected Delete, got {:?}", other),
        }
    }
}
