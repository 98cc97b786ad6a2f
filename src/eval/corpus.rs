//! Corpus-level evaluation: score every ground-truth query and aggregate
//! into a [`SummaryReport`].

use crate::config::EvalOptions;
use crate::error::{EvalWarning, QueryId, Result};
use crate::eval::metrics::{evaluate_query, mean_reciprocal_rank, QueryResult};
use crate::eval::RelevanceIndex;
use crate::ingest::{GroundTruthRecord, Predictions};
use rayon::prelude::*;
use serde::Serialize;

/// Aggregate metrics and diagnostics for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    /// Cutoff used for every query.
    pub k: usize,
    /// MRR@K over evaluated queries (missing predictions excluded).
    pub mrr: f64,
    /// Mean first-hit rank over queries that had a hit.
    pub avg_rank_first_hit: Option<f64>,
    /// Queries with no hit in top-K plus queries with no predictions.
    pub no_match_count: usize,
    /// Query ids counted in `no_match_count`, in ground-truth order.
    pub no_match_queries: Vec<QueryId>,
    /// Distinct ground-truth queries.
    pub total_queries: usize,
    /// Ground-truth queries that had predictions and were scored.
    pub evaluated_queries: usize,
    pub missing_predictions: Vec<QueryId>,
    /// Predicted query ids with no ground truth, in predictions order.
    pub missing_ground_truth: Vec<QueryId>,
    pub total_false_positives: usize,
    pub total_false_negatives: usize,
    /// Mean Precision@K over evaluated queries.
    pub mean_precision: f64,
    /// Mean Recall@K over evaluated queries.
    pub mean_recall: f64,
    /// First `sample_size` scored queries, in ground-truth order.
    pub sample: Vec<QueryResult>,
}

impl SummaryReport {
    /// Recoverable conditions met during the run.
    pub fn warnings(&self) -> Vec<EvalWarning> {
        self.missing_predictions
            .iter()
            .map(|&qid| EvalWarning::MissingPrediction(qid))
            .chain(
                self.missing_ground_truth
                    .iter()
                    .map(|&qid| EvalWarning::MissingGroundTruth(qid)),
            )
            .collect()
    }
}

/// Build the relevance index from `records` and evaluate `predictions` against it.
pub fn evaluate_corpus<I>(
    records: I,
    predictions: &Predictions,
    options: &EvalOptions,
) -> Result<SummaryReport>
where
    I: IntoIterator<Item = GroundTruthRecord>,
{
    let index = RelevanceIndex::build(records)?;
    Ok(evaluate_index(&index, predictions, options))
}

/// Evaluate every query of `index`, in index order.
pub fn evaluate_index(
    index: &RelevanceIndex,
    predictions: &Predictions,
    options: &EvalOptions,
) -> SummaryReport {
    let query_ids: Vec<QueryId> = index.query_ids().collect();
    let k = options.k;

    let score = |qid: QueryId| -> Option<QueryResult> {
        let relevant = index.get(qid)?;
        let ranked = predictions.get(qid)?;
        Some(evaluate_query(qid, ranked, relevant, k))
    };

    // Indexed collect keeps ground-truth order regardless of completion order
    let outcomes: Vec<Option<QueryResult>> = if options.parallel {
        query_ids.par_iter().map(|&qid| score(qid)).collect()
    } else {
        query_ids.iter().map(|&qid| score(qid)).collect()
    };

    let mut results = Vec::with_capacity(outcomes.len());
    let mut missing_predictions = Vec::new();
    let mut no_match_queries = Vec::new();
    for (qid, outcome) in query_ids.iter().copied().zip(outcomes) {
        match outcome {
            Some(result) => {
                if !result.is_hit() {
                    no_match_queries.push(qid);
                }
                results.push(result);
            }
            None => {
                log::warn!("{}", EvalWarning::MissingPrediction(qid));
                missing_predictions.push(qid);
                no_match_queries.push(qid);
            }
        }
    }

    let missing_ground_truth: Vec<QueryId> = predictions
        .query_ids()
        .filter(|qid| !index.contains(*qid))
        .collect();
    for &qid in &missing_ground_truth {
        log::warn!("{}", EvalWarning::MissingGroundTruth(qid));
    }

    let hit_count = results.iter().filter(|r| r.is_hit()).count();
    let rank_sum: usize = results.iter().filter_map(|r| r.rank).sum();
    let avg_rank_first_hit = (hit_count > 0).then(|| rank_sum as f64 / hit_count as f64);

    let report = SummaryReport {
        k,
        mrr: mean_reciprocal_rank(&results),
        avg_rank_first_hit,
        no_match_count: no_match_queries.len(),
        no_match_queries,
        total_queries: index.len(),
        evaluated_queries: results.len(),
        missing_predictions,
        missing_ground_truth,
        total_false_positives: results.iter().map(|r| r.false_positives.len()).sum(),
        total_false_negatives: results.iter().map(|r| r.false_negatives.len()).sum(),
        mean_precision: mean(results.iter().map(|r| r.precision), results.len()),
        mean_recall: mean(results.iter().map(|r| r.recall), results.len()),
        sample: results.iter().take(options.sample_size).cloned().collect(),
    };

    log::info!(
        "Evaluated {}/{} queries at k={}: MRR {:.4}, {} without a hit",
        report.evaluated_queries,
        report.total_queries,
        k,
        report.mrr,
        report.no_match_count
    );
    report
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}
