//! Sub-batch planning.
//!
//! The delivery API caps both the number of entries a collection query
//! returns and the size of the request body. A type's id set is therefore
//! split into sub-batches before it is sent. Ids are taken in sorted order so
//! the same set always produces the same partition.

use std::collections::BTreeSet;

use crate::config::BatchBudget;

/// Split `ids` into chunks of at most `max_ids_per_batch` ids.
///
/// A limit of 0 is treated as 1.
pub fn plan(ids: &BTreeSet<String>, max_ids_per_batch: usize) -> Vec<Vec<String>> {
    let size = max_ids_per_batch.max(1);
    let sorted: Vec<String> = ids.iter().cloned().collect();
    sorted.chunks(size).map(<[String]>::to_vec).collect()
}

/// Bytes an id adds to a request's `ids` variable: the JSON string plus a separator.
pub fn estimated_id_bytes(id: &str) -> usize {
    serde_json::to_string(id)
        .map(|s| s.len())
        .unwrap_or(id.len() + 2)
        + 1
}

/// Split `ids` under both the id-count and byte limits of `budget`.
///
/// `base_bytes` is the size of the request with an empty id list. A chunk is
/// closed before adding an id would push its estimate past
/// `max_request_bytes`. An id that alone exceeds the budget still gets a
/// chunk of its own; the upstream decides what to do with it.
pub fn plan_with_budget(
    ids: &BTreeSet<String>,
    budget: &BatchBudget,
    base_bytes: usize,
) -> Vec<Vec<String>> {
    let max_ids = budget.max_ids_per_batch.max(1);
    let mut batches = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut bytes = base_bytes;

    for id in ids {
        let cost = estimated_id_bytes(id);
        let over_count = current.len() >= max_ids;
        let over_bytes = bytes + cost > budget.max_request_bytes;
        if !current.is_empty() && (over_count || over_bytes) {
            batches.push(std::mem::take(&mut current));
            bytes = base_bytes;
        }
        bytes += cost;
        current.push(id.clone());
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> BTreeSet<String> {
        (0..n).map(|i| format!("id{:04}", i)).collect()
    }

    #[test]
    fn test_120_ids_by_50() {
        let batches = plan(&ids(120), 50);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
    }

    #[test]
    fn test_empty_set_has_no_batches() {
        assert!(plan(&BTreeSet::new(), 50).is_empty());
        assert!(plan_with_budget(&BTreeSet::new(), &BatchBudget::default(), 100).is_empty());
    }

    #[test]
    fn test_zero_limit_is_one() {
        assert_eq!(plan(&ids(3), 0).len(), 3);
    }

    #[test]
    fn test_partition_is_sorted_and_stable() {
        let set: BTreeSet<String> = ["c", "a", "b"].iter().map(|s| s.to_string()).collect();
        let first = plan(&set, 2);
        assert_eq!(first, vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(first, plan(&set, 2));
    }

    #[test]
    fn test_budget_without_byte_pressure_matches_plan() {
        let set = ids(120);
        assert_eq!(
            plan_with_budget(&set, &BatchBudget::new(50, usize::MAX), 0),
            plan(&set, 50)
        );
    }

    #[test]
    fn test_byte_budget_splits_earlier() {
        // Each "id0000" costs 9 bytes; 100 base + 5 * 9 = 145 fits, a sixth does not.
        let budget = BatchBudget::new(50, 150);
        let batches = plan_with_budget(&ids(12), &budget, 100);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[test]
    fn test_oversized_id_gets_own_batch() {
        let mut set = ids(2);
        set.insert("x".repeat(500));
        let batches = plan_with_budget(&set, &BatchBudget::new(50, 200), 100);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().any(|b| b.len() == 1 && b[0].len() == 500));
    }

    #[test]
    fn test_estimated_id_bytes_counts_escapes() {
        assert_eq!(estimated_id_bytes("abc"), 6);
        assert_eq!(estimated_id_bytes("a\"b"), 7);
    }
}
