//! Per-query ranking metrics: first-hit rank, reciprocal rank, Precision@K,
//! Recall@K, and false positive/negative diagnostics.

use crate::error::{ItemId, QueryId};
use crate::eval::RelevanceSet;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Outcome of scoring one query's top-K predictions against its relevance set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query_id: QueryId,
    /// 1-based position of the first relevant prediction, if any within top-K.
    pub rank: Option<usize>,
    /// `1 / rank`, or 0.0 when there is no hit.
    pub reciprocal_rank: f64,
    /// Top-K predictions that are not relevant, in rank order (duplicates kept).
    pub false_positives: Vec<ItemId>,
    /// Relevant items missing from the top-K predictions.
    pub false_negatives: Vec<ItemId>,
    /// Precision@K for this query.
    pub precision: f64,
    /// Recall@K for this query.
    pub recall: f64,
}

impl QueryResult {
    pub fn is_hit(&self) -> bool {
        self.rank.is_some()
    }
}

/// Score one query.
///
/// Only the first `k` predictions are considered; a shorter list is used as is.
pub fn evaluate_query(
    query_id: QueryId,
    predictions: &[ItemId],
    relevant: &RelevanceSet,
    k: usize,
) -> QueryResult {
    let top_k = &predictions[..k.min(predictions.len())];

    let rank = first_hit_rank(top_k, relevant);
    let false_positives = top_k
        .iter()
        .copied()
        .filter(|id| !relevant.contains(*id))
        .collect();
    let retrieved: HashSet<ItemId> = top_k.iter().copied().collect();
    let false_negatives = relevant
        .iter()
        .filter(|id| !retrieved.contains(id))
        .collect();

    QueryResult {
        query_id,
        rank,
        reciprocal_rank: reciprocal_rank(rank),
        false_positives,
        false_negatives,
        precision: precision_at_k(predictions, relevant, k),
        recall: recall_at_k(predictions, relevant, k),
    }
}

/// 1-based position of the first relevant item in `ranked`.
pub fn first_hit_rank(ranked: &[ItemId], relevant: &RelevanceSet) -> Option<usize> {
    ranked
        .iter()
        .position(|id| relevant.contains(*id))
        .map(|i| i + 1)
}

/// `1 / rank`, or 0.0 for no hit.
pub fn reciprocal_rank(rank: Option<usize>) -> f64 {
    match rank {
        Some(r) => 1.0 / r as f64,
        None => 0.0,
    }
}

/// Precision at K: proportion of top-K results that are relevant.
/// Returns (relevant count in top-K) / K. If k is 0, returns 0.0.
pub fn precision_at_k(ranked: &[ItemId], relevant: &RelevanceSet, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let relevant_count = ranked
        .iter()
        .take(k)
        .filter(|id| relevant.contains(**id))
        .count();
    relevant_count as f64 / k as f64
}

/// Recall at K: proportion of all relevant items that appear in top-K.
/// Returns (distinct relevant retrieved in top-K) / |relevant|. If there are no
/// relevant items (denominator 0), returns 0.0.
pub fn recall_at_k(ranked: &[ItemId], relevant: &RelevanceSet, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let retrieved_relevant: HashSet<ItemId> = ranked
        .iter()
        .take(k)
        .copied()
        .filter(|id| relevant.contains(*id))
        .collect();
    retrieved_relevant.len() as f64 / relevant.len() as f64
}

/// Mean Reciprocal Rank over scored queries. Returns 0.0 if `results` is empty.
///
/// Hits are tallied per rank and summed in ascending rank order, so the value
/// does not depend on the order of `results`.
pub fn mean_reciprocal_rank(results: &[QueryResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let mut hits_by_rank: BTreeMap<usize, usize> = BTreeMap::new();
    for rank in results.iter().filter_map(|r| r.rank) {
        *hits_by_rank.entry(rank).or_insert(0) += 1;
    }
    let sum: f64 = hits_by_rank
        .iter()
        .map(|(rank, count)| *count as f64 / *rank as f64)
        .sum();
    sum / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[ItemId]) -> RelevanceSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn evaluate_query_hit_at_second_position() {
        let result = evaluate_query(1, &[50, 100, 200, 7, 8], &set(&[100, 200]), 10);
        assert_eq!(result.rank, Some(2));
        assert!((result.reciprocal_rank - 0.5).abs() < 1e-12);
        assert_eq!(result.false_positives, vec![50, 7, 8]);
        assert!(result.false_negatives.is_empty());
        assert!(result.is_hit());
    }

    #[test]
    fn evaluate_query_no_hit_in_top_k() {
        let predictions: Vec<ItemId> = (1..=10).collect();
        let result = evaluate_query(2, &predictions, &set(&[999]), 10);
        assert_eq!(result.rank, None);
        assert_eq!(result.reciprocal_rank, 0.0);
        assert_eq!(result.false_negatives, vec![999]);
        assert_eq!(result.false_positives, predictions);
    }

    #[test]
    fn evaluate_query_ignores_predictions_beyond_k() {
        let result = evaluate_query(3, &[1, 2, 3, 42], &set(&[42]), 3);
        assert_eq!(result.rank, None);
        assert_eq!(result.reciprocal_rank, 0.0);
        assert_eq!(result.false_positives, vec![1, 2, 3]);
        assert_eq!(result.false_negatives, vec![42]);
    }

    #[test]
    fn evaluate_query_hit_at_k_boundary() {
        let result = evaluate_query(3, &[1, 2, 3, 42], &set(&[42]), 4);
        assert_eq!(result.rank, Some(4));
        assert!((result.reciprocal_rank - 0.25).abs() < 1e-12);
    }

    #[test]
    fn evaluate_query_short_list_uses_available_entries() {
        let result = evaluate_query(4, &[9, 5], &set(&[5, 6]), 10);
        assert_eq!(result.rank, Some(2));
        assert_eq!(result.false_positives, vec![9]);
        assert_eq!(result.false_negatives, vec![6]);
    }

    #[test]
    fn evaluate_query_empty_relevance_set() {
        let result = evaluate_query(5, &[1, 2, 3], &RelevanceSet::new(), 10);
        assert_eq!(result.rank, None);
        assert_eq!(result.reciprocal_rank, 0.0);
        assert!(result.false_negatives.is_empty());
        assert_eq!(result.false_positives, vec![1, 2, 3]);
        assert_eq!(result.recall, 0.0);
    }

    #[test]
    fn evaluate_query_empty_predictions() {
        let result = evaluate_query(6, &[], &set(&[1]), 10);
        assert_eq!(result.rank, None);
        assert!(result.false_positives.is_empty());
        assert_eq!(result.false_negatives, vec![1]);
    }

    #[test]
    fn evaluate_query_first_occurrence_wins_with_duplicates() {
        let result = evaluate_query(7, &[3, 1, 1, 2], &set(&[1, 2]), 10);
        assert_eq!(result.rank, Some(2));
        assert_eq!(result.false_positives, vec![3]);
    }

    #[test]
    fn evaluate_query_false_positives_keep_duplicates() {
        let result = evaluate_query(8, &[4, 4, 1], &set(&[1]), 10);
        assert_eq!(result.false_positives, vec![4, 4]);
    }

    #[test]
    fn reciprocal_rank_values_stay_in_range() {
        let k = 10;
        for p in 1..=k {
            let mut predictions: Vec<ItemId> = (100..100 + k as ItemId).collect();
            predictions[p - 1] = 1;
            let result = evaluate_query(1, &predictions, &set(&[1]), k);
            assert_eq!(result.rank, Some(p));
            assert_eq!(result.reciprocal_rank, 1.0 / p as f64);
        }
    }

    #[test]
    fn precision_at_k_partial() {
        let p = precision_at_k(&[1, 2, 9], &set(&[1, 2]), 3);
        assert!((p - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn precision_at_k_zero_k() {
        assert_eq!(precision_at_k(&[1], &set(&[1]), 0), 0.0);
    }

    #[test]
    fn precision_at_k_divides_by_k_for_short_lists() {
        let p = precision_at_k(&[1], &set(&[1]), 10);
        assert!((p - 0.1).abs() < 1e-12);
    }

    #[test]
    fn recall_at_k_partial() {
        let r = recall_at_k(&[1, 9], &set(&[1, 2]), 10);
        assert!((r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn recall_at_k_counts_distinct_hits() {
        let r = recall_at_k(&[1, 1, 1], &set(&[1, 2]), 10);
        assert!((r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn recall_at_k_empty_relevant() {
        assert_eq!(recall_at_k(&[1], &RelevanceSet::new(), 10), 0.0);
    }

    #[test]
    fn mrr_over_results() {
        let results = vec![
            evaluate_query(1, &[1], &set(&[1]), 10),
            evaluate_query(2, &[9, 2], &set(&[2]), 10),
            evaluate_query(3, &[9], &set(&[3]), 10),
        ];
        assert!((mean_reciprocal_rank(&results) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn mrr_empty_results() {
        assert_eq!(mean_reciprocal_rank(&[]), 0.0);
    }
}
