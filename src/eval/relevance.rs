//! Relevance index: query id → set of relevant item ids, built from ground truth.

use crate::error::{ItemId, ParseError, QueryId, RecordLocation, Result};
use crate::ingest::{parse_id_list, GroundTruthRecord};
use std::collections::{HashMap, HashSet};

/// Relevant items for one query.
///
/// Membership is set-like; iteration follows first insertion so derived lists
/// (false negatives) come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceSet {
    items: Vec<ItemId>,
    lookup: HashSet<ItemId>,
}

impl RelevanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, item: ItemId) -> bool {
        let added = self.lookup.insert(item);
        if added {
            self.items.push(item);
        }
        added
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.lookup.contains(&item)
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ItemId> for RelevanceSet {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// Mapping from query id to its relevance set.
#[derive(Debug, Clone, Default)]
pub struct RelevanceIndex {
    order: Vec<QueryId>,
    sets: HashMap<QueryId, RelevanceSet>,
}

impl RelevanceIndex {
    /// Build the index from ground-truth records.
    ///
    /// Each record's relevant-ids cell is parsed with [`parse_id_list`]; the
    /// first malformed cell aborts the build. A query id that appears on more
    /// than one line gets the union of those rows' relevant ids.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = GroundTruthRecord>,
    {
        let mut index = Self::default();

        for record in records {
            let ids = parse_id_list(&record.relevant_ids).map_err(|e| ParseError {
                location: RecordLocation::GroundTruthRow {
                    line: record.line,
                    query_id: Some(record.query_id),
                },
                raw: record.relevant_ids.clone(),
                reason: e.to_string(),
            })?;

            match index.sets.get_mut(&record.query_id) {
                Some(set) => {
                    log::debug!(
                        "Merging duplicate ground truth for qid {} (line {})",
                        record.query_id,
                        record.line
                    );
                    for id in ids {
                        set.insert(id);
                    }
                }
                None => {
                    index.order.push(record.query_id);
                    index.sets.insert(record.query_id, ids.into_iter().collect());
                }
            }
        }

        log::debug!("Built relevance index for {} queries", index.len());
        Ok(index)
    }

    pub fn get(&self, query_id: QueryId) -> Option<&RelevanceSet> {
        self.sets.get(&query_id)
    }

    pub fn contains(&self, query_id: QueryId) -> bool {
        self.sets.contains_key(&query_id)
    }

    /// Query ids in ground-truth order (first appearance).
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
