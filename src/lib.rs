pub mod config;
pub mod error;
pub mod eval;
pub mod ingest;

pub use config::{Config, EvalOptions, EvalOverrides};
pub use error::{EvalWarning, ItemId, ParseError, QueryId, RankevalError, RecordLocation, Result};
pub use eval::{evaluate_corpus, evaluate_query, QueryResult, RelevanceIndex, SummaryReport};
