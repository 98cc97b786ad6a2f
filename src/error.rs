use std::fmt;
use thiserror::Error;

/// Integer identifier of a query; joins ground truth and predictions.
pub type QueryId = i64;

/// Integer identifier of a retrievable candidate (document, passage, ...).
pub type ItemId = i64;

/// Main error type for rankeval
#[derive(Error, Debug)]
pub enum RankevalError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A ground-truth or prediction record could not be converted to ids
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration errors (invalid cutoff, invalid sample size, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structurally invalid input (e.g. missing CSV columns)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Where a malformed record was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLocation {
    /// 1-based line of the ground-truth file where the record starts
    /// (the header is line 1).
    /// `query_id` is absent when the query id itself failed to parse.
    GroundTruthRow {
        line: usize,
        query_id: Option<QueryId>,
    },
    /// 1-based line of the predictions file.
    PredictionLine { line: usize },
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordLocation::GroundTruthRow {
                line,
                query_id: Some(qid),
            } => write!(f, "ground truth line {} (qid {})", line, qid),
            RecordLocation::GroundTruthRow { line, query_id: None } => {
                write!(f, "ground truth line {}", line)
            }
            RecordLocation::PredictionLine { line } => write!(f, "predictions line {}", line),
        }
    }
}

/// A record whose id field(s) could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error at {location}: {reason} (raw: {raw:?})")]
pub struct ParseError {
    pub location: RecordLocation,
    /// The offending raw text.
    pub raw: String,
    pub reason: String,
}

/// Recoverable conditions found while evaluating a corpus.
///
/// These never abort evaluation; they are logged and counted in the report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalWarning {
    #[error("No predictions found for qid {0}")]
    MissingPrediction(QueryId),

    #[error("No ground truth found for predicted qid {0}")]
    MissingGroundTruth(QueryId),
}

/// Convenient Result type using RankevalError
pub type Result<T> = std::result::Result<T, RankevalError>;
