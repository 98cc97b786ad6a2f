//! Console rendering of evaluation results.

use crate::error::ItemId;
use crate::eval::SummaryReport;
use std::fmt::Write;

/// Single-line score: `MRR@10: 0.7500`.
pub fn render_score(report: &SummaryReport) -> String {
    format!("MRR@{}: {:.4}", report.k, report.mrr)
}

/// Full error-analysis report.
pub fn render_summary(report: &SummaryReport) -> String {
    let mut out = String::new();
    let k = report.k;

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", render_score(report));
    let _ = writeln!(
        out,
        "Average rank of first relevant prediction: {}",
        report
            .avg_rank_first_hit
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "N/A".to_string())
    );
    let _ = writeln!(
        out,
        "Queries with no relevant predictions in top-{}: {}/{}",
        k, report.no_match_count, report.total_queries
    );
    if !report.missing_predictions.is_empty() {
        let _ = writeln!(
            out,
            "Queries without predictions: {}",
            report.missing_predictions.len()
        );
    }
    if !report.missing_ground_truth.is_empty() {
        let _ = writeln!(
            out,
            "Predicted queries without ground truth: {}",
            report.missing_ground_truth.len()
        );
    }
    let _ = writeln!(out, "Precision@{}: {:.2}%", k, report.mean_precision * 100.0);
    let _ = writeln!(out, "Recall@{}:    {:.2}%", k, report.mean_recall * 100.0);

    let _ = writeln!(out, "\nError Analysis (Sample):");
    if report.sample.is_empty() {
        let _ = writeln!(out, "  (no evaluated queries)");
    }
    for result in &report.sample {
        let _ = writeln!(out, "\nQuery ID {}:", result.query_id);
        let _ = writeln!(out, "  False Positives: {}", id_list(&result.false_positives));
        let _ = writeln!(out, "  False Negatives: {}", id_list(&result.false_negatives));
    }

    let _ = writeln!(
        out,
        "\nTotal False Positives in top-{}: {}",
        k, report.total_false_positives
    );
    let _ = write!(
        out,
        "Total False Negatives in top-{}: {}",
        k, report.total_false_negatives
    );
    out
}

fn id_list(ids: &[ItemId]) -> String {
    let inner: Vec<String> = ids.iter().map(ItemId::to_string).collect();
    format!("[{}]", inner.join(", "))
}
