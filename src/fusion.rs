//! Reciprocal Rank Fusion of vector and lexical result lists.
//!
//! Each source contributes `1 / (k + idx)` for an item at zero-based
//! position `idx`. Contributions are summed per `(title, content)` key, so
//! an item found by both searches generally outranks one found by a single
//! search. Raw scores are never compared across sources; only positions
//! matter.

use std::collections::HashMap;

use crate::models::{FusedResult, IndexRecord, RankedItem};

/// Default RRF damping constant.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Assign zero-based ranks to an already best-first list.
pub fn rank_records(records: &[IndexRecord]) -> Vec<RankedItem> {
    records
        .iter()
        .enumerate()
        .map(|(rank, r)| RankedItem {
            title: r.title.clone(),
            content: r.content.clone(),
            rank,
        })
        .collect()
}

/// Fuse two best-first ranked lists into at most `limit` distinct results.
///
/// Ties keep first-encountered order, scanning `vector` before `lexical`.
pub fn reciprocal_rank_fusion(
    vector: &[RankedItem],
    lexical: &[RankedItem],
    k: f64,
    limit: usize,
) -> Vec<FusedResult> {
    let mut order: Vec<FusedResult> = Vec::new();
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();

    for list in [vector, lexical] {
        for item in list {
            let contribution = 1.0 / (k + item.rank as f64);
            let key = (item.title.as_str(), item.content.as_str());
            match positions.get(&key) {
                Some(&pos) => order[pos].score += contribution,
                None => {
                    positions.insert(key, order.len());
                    order.push(FusedResult {
                        title: item.title.clone(),
                        content: item.content.clone(),
                        score: contribution,
                    });
                }
            }
        }
    }

    // sort_by is stable, so equal scores keep insertion order
    order.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(limit);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(keys: &[&str]) -> Vec<RankedItem> {
        keys.iter()
            .enumerate()
            .map(|(rank, k)| RankedItem {
                title: format!("note {}", k),
                content: format!("content {}", k),
                rank,
            })
            .collect()
    }

    fn score_of(results: &[FusedResult], key: &str) -> f64 {
        results
            .iter()
            .find(|r| r.title == format!("note {}", key))
            .map(|r| r.score)
            .unwrap()
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reciprocal_rank_fusion(&[], &[], DEFAULT_RRF_K, 10).is_empty());
    }

    #[test]
    fn test_scores_sum_across_sources() {
        let vector = items(&["A", "B", "C"]);
        let lexical = items(&["C", "A", "D"]);
        let results = reciprocal_rank_fusion(&vector, &lexical, 60.0, 10);

        assert_eq!(results.len(), 4);
        assert!((score_of(&results, "A") - (1.0 / 60.0 + 1.0 / 61.0)).abs() < 1e-12);
        assert!((score_of(&results, "C") - (1.0 / 62.0 + 1.0 / 60.0)).abs() < 1e-12);
        assert!((score_of(&results, "B") - 1.0 / 61.0).abs() < 1e-12);
        assert!((score_of(&results, "D") - 1.0 / 62.0).abs() < 1e-12);

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["note A", "note C", "note B", "note D"]);
    }

    #[test]
    fn test_both_sources_outrank_single_source() {
        let vector = items(&["X", "Y"]);
        let lexical = items(&["Z", "Y"]);
        let results = reciprocal_rank_fusion(&vector, &lexical, 60.0, 10);
        // Y is second in both lists but beats X and Z, each first in one
        assert_eq!(results[0].title, "note Y");
    }

    #[test]
    fn test_no_duplicate_keys() {
        let vector = items(&["A", "B", "C"]);
        let lexical = items(&["A", "B", "C"]);
        let results = reciprocal_rank_fusion(&vector, &lexical, 60.0, 10);
        assert_eq!(results.len(), 3);
        let mut titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        titles.dedup();
        assert_eq!(titles.len(), 3);
    }

    #[test]
    fn test_same_title_different_content_are_distinct() {
        let vector = vec![
            RankedItem {
                title: "Recipes".into(),
                content: "chunk one".into(),
                rank: 0,
            },
            RankedItem {
                title: "Recipes".into(),
                content: "chunk two".into(),
                rank: 1,
            },
        ];
        let results = reciprocal_rank_fusion(&vector, &[], 60.0, 10);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let vector = items(&["P"]);
        let lexical = items(&["Q"]);
        let results = reciprocal_rank_fusion(&vector, &lexical, 60.0, 10);
        assert_eq!(results[0].title, "note P");
        assert_eq!(results[1].title, "note Q");
    }

    #[test]
    fn test_limit_truncates() {
        let vector = items(&["A", "B", "C", "D"]);
        let lexical = items(&["E", "F"]);
        let results = reciprocal_rank_fusion(&vector, &lexical, 60.0, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "note A");
        assert_eq!(results[1].title, "note E");
    }

    #[test]
    fn test_rank_records() {
        let records = vec![
            IndexRecord::new("a", "one", None, None),
            IndexRecord::new("b", "two", None, None),
        ];
        let ranked = rank_records(&records);
        assert_eq!(ranked[0].rank, 0);
        assert_eq!(ranked[1].rank, 1);
        assert_eq!(ranked[1].title, "b");
    }
}
