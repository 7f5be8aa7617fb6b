//! Label id allocation.
//!
//! Label ids are small positive integers, unique within a board and handed
//! out in increasing order. The allocator holds no lock: callers invoke it
//! once per new label inside a single write so allocations are serialized
//! per board.

use std::collections::HashSet;

use super::{Label, LabelInput};

/// Labels seeded onto every new board: `(name, color)`.
pub const DEFAULT_LABELS: &[(&str, &str)] = &[
    ("Low priority", "green"),
    ("Medium priority", "yellow"),
    ("High priority", "orange"),
    ("Urgent", "red"),
    ("Bug", "purple"),
    ("Feature", "blue"),
];

/// The default label set with ids `1..=DEFAULT_LABELS.len()`.
pub fn default_labels() -> Vec<Label> {
    DEFAULT_LABELS
        .iter()
        .zip(1..)
        .map(|(&(name, color), id)| Label {
            id,
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
}

/// Next id for a label appended to `labels`.
///
/// Returns `1` for an empty sequence, otherwise one more than the largest
/// id. Non-positive ids count as `0`.
pub fn next_label_id(labels: &[Label]) -> i64 {
    labels.iter().map(|l| l.id.max(0)).max().unwrap_or(0) + 1
}

/// Largest id present in `labels`, or `0`.
pub fn max_label_id(labels: &[Label]) -> i64 {
    next_label_id(labels) - 1
}

/// Resolve client-supplied labels into stored labels.
///
/// Labels that carry a positive id not already taken keep it. The rest get
/// fresh ids, one at a time in input order. `label_seq` is the board's
/// high-water mark: fresh ids are always above it, so an id is never reused
/// after its label was removed. Returns the labels and the new high-water
/// mark.
pub fn assign_label_ids(inputs: Vec<LabelInput>, label_seq: i64) -> (Vec<Label>, i64) {
    let mut seen = HashSet::new();
    let mut keep = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let explicit = input.id.filter(|&id| id > 0 && seen.insert(id));
        keep.push(explicit);
    }

    let explicit: Vec<Label> = inputs
        .iter()
        .zip(&keep)
        .filter_map(|(input, id)| {
            id.map(|id| Label {
                id,
                name: input.name.clone(),
                color: input.color.clone(),
            })
        })
        .collect();
    let mut high_water = label_seq.max(max_label_id(&explicit));

    let mut labels = Vec::with_capacity(inputs.len());
    for (input, id) in inputs.into_iter().zip(keep) {
        let id = match id {
            Some(id) => id,
            None => {
                let fresh = next_label_id(&labels).max(high_water + 1);
                high_water = fresh;
                fresh
            }
        };
        labels.push(Label {
            id,
            name: input.name,
            color: input.color,
        });
    }

    let seq = high_water.max(max_label_id(&labels));
    (labels, seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(id: i64) -> Label {
        Label {
            id,
            name: format!("label {id}"),
            color: "green".to_string(),
        }
    }

    fn input(id: Option<i64>, name: &str) -> LabelInput {
        LabelInput {
            id,
            name: name.to_string(),
            color: "blue".to_string(),
        }
    }

    #[test]
    fn empty_sequence_starts_at_one() {
        assert_eq!(next_label_id(&[]), 1);
    }

    #[test]
    fn gap_in_ids_uses_max_plus_one() {
        assert_eq!(next_label_id(&[label(1), label(3)]), 4);
    }

    #[test]
    fn next_id_exceeds_every_existing_id() {
        let labels = vec![label(7), label(2), label(5)];
        let next = next_label_id(&labels);
        assert!(labels.iter().all(|l| next > l.id));
    }

    #[test]
    fn missing_or_negative_ids_count_as_zero() {
        assert_eq!(next_label_id(&[label(0)]), 1);
        assert_eq!(next_label_id(&[label(-4), label(2)]), 3);
    }

    #[test]
    fn default_labels_are_numbered_from_one() {
        let labels = default_labels();
        assert_eq!(labels.len(), DEFAULT_LABELS.len());
        let ids: Vec<i64> = labels.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(next_label_id(&labels), 7);
    }

    #[test]
    fn new_labels_get_sequential_ids_after_existing() {
        let inputs = vec![input(Some(1), "a"), input(None, "b"), input(None, "c")];
        let (labels, seq) = assign_label_ids(inputs, 1);
        let ids: Vec<i64> = labels.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(seq, 3);
    }

    #[test]
    fn removed_label_ids_are_not_reused() {
        // Board once had labels 1..=4; label 4 was removed.
        let inputs = vec![input(Some(1), "a"), input(None, "new")];
        let (labels, seq) = assign_label_ids(inputs, 4);
        assert_eq!(labels[1].id, 5);
        assert_eq!(seq, 5);
    }

    #[test]
    fn explicit_ids_later_in_input_are_respected() {
        let inputs = vec![input(None, "new"), input(Some(9), "kept")];
        let (labels, seq) = assign_label_ids(inputs, 0);
        assert_eq!(labels[0].id, 10);
        assert_eq!(labels[1].id, 9);
        assert_eq!(seq, 10);
    }

    #[test]
    fn duplicate_ids_are_reassigned() {
        let inputs = vec![input(Some(2), "a"), input(Some(2), "b")];
        let (labels, _) = assign_label_ids(inputs, 2);
        assert_eq!(labels[0].id, 2);
        assert_eq!(labels[1].id, 3);
    }

    #[test]
    fn sequence_covers_explicit_ids_above_high_water() {
        let inputs = vec![input(Some(12), "kept"), input(Some(3), "low")];
        let (labels, seq) = assign_label_ids(inputs, 5);
        let ids: Vec<i64> = labels.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![12, 3]);
        assert_eq!(seq, 12);
    }

    #[test]
    fn non_positive_ids_are_treated_as_unassigned() {
        let inputs = vec![input(Some(0), "zero"), input(Some(-1), "neg")];
        let (labels, seq) = assign_label_ids(inputs, 0);
        let ids: Vec<i64> = labels.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(seq, 2);
    }
}
