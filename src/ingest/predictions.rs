//! Predictions reader: one query per line, tab-separated,
//! `qid \t item_1 \t item_2 ...` with rank 1 first.

use crate::error::{ItemId, ParseError, QueryId, RecordLocation, Result};
use crate::ingest::ids::parse_id;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Ranked prediction lists keyed by query id.
///
/// Remembers the order in which query ids first appeared so that reporting
/// over predictions (e.g. missing ground truth) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Predictions {
    order: Vec<QueryId>,
    lists: HashMap<QueryId, Vec<ItemId>>,
}

impl Predictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read predictions from a file. See [`Predictions::from_reader`] for `limit`.
    pub fn load(path: &Path, limit: Option<usize>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let predictions = Self::from_reader(std::io::BufReader::new(file), limit)?;
        log::info!(
            "Loaded predictions for {} queries from {}",
            predictions.len(),
            path.display()
        );
        Ok(predictions)
    }

    /// Parse tab-separated prediction lines.
    ///
    /// With `Some(limit)`, only the first `limit` ids of each line are kept
    /// (and parsed). Blank lines are skipped. A query id seen twice replaces
    /// its earlier list. A line that is not valid UTF-8 is a parse error at
    /// that line.
    pub fn from_reader<R: BufRead>(reader: R, limit: Option<usize>) -> Result<Self> {
        let mut predictions = Self::new();

        for (i, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let line_no = i + 1;
            let line = String::from_utf8(bytes).map_err(|e| ParseError {
                location: RecordLocation::PredictionLine { line: line_no },
                raw: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                reason: "line is not valid UTF-8".to_string(),
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut fields = trimmed.split('\t');
            let raw_qid = fields.next().unwrap_or("");
            let query_id = raw_qid.trim().parse::<QueryId>().map_err(|_| ParseError {
                location: RecordLocation::PredictionLine { line: line_no },
                raw: raw_qid.to_string(),
                reason: "invalid query id".to_string(),
            })?;

            let ids = fields
                .take(limit.unwrap_or(usize::MAX))
                .map(|field| {
                    parse_id(field.trim()).map_err(|e| ParseError {
                        location: RecordLocation::PredictionLine { line: line_no },
                        raw: field.to_string(),
                        reason: e.to_string(),
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;

            if predictions.insert(query_id, ids).is_some() {
                log::warn!(
                    "Duplicate predictions for qid {} on line {}; keeping the later list",
                    query_id,
                    line_no
                );
            }
        }

        Ok(predictions)
    }

    /// Insert or replace the ranked list for a query, returning the previous list.
    pub fn insert(&mut self, query_id: QueryId, ids: Vec<ItemId>) -> Option<Vec<ItemId>> {
        let previous = self.lists.insert(query_id, ids);
        if previous.is_none() {
            self.order.push(query_id);
        }
        previous
    }

    /// Ranked list for a query, rank 1 first.
    pub fn get(&self, query_id: QueryId) -> Option<&[ItemId]> {
        self.lists.get(&query_id).map(Vec::as_slice)
    }

    pub fn contains(&self, query_id: QueryId) -> bool {
        self.lists.contains_key(&query_id)
    }

    /// Query ids in first-appearance order.
    pub fn query_ids(&self) -> impl Iterator<Item = QueryId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<(QueryId, Vec<ItemId>)> for Predictions {
    fn from_iter<I: IntoIterator<Item = (QueryId, Vec<ItemId>)>>(iter: I) -> Self {
        let mut predictions = Self::new();
        for (query_id, ids) in iter {
            predictions.insert(query_id, ids);
        }
        predictions
    }
}
