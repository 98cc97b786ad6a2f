//! Evaluation engine: relevance index, per-query metrics (rank, RR, P@K, R@K),
//! corpus aggregation (MRR@K), and report rendering.

pub mod corpus;
pub mod metrics;
pub mod relevance;
pub mod report;

pub use corpus::{evaluate_corpus, evaluate_index, SummaryReport};
pub use metrics::{
    evaluate_query, mean_reciprocal_rank, precision_at_k, recall_at_k, reciprocal_rank, QueryResult,
};
pub use relevance::{RelevanceIndex, RelevanceSet};
pub use report::{render_score, render_summary};
