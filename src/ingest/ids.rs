//! Grammar for serialized id lists such as `[73560 85057 69992]`.
//!
//! ```text
//! list  := ws? ( "[" items "]" | items ) ws?
//! items := ( ws? integer )* ws?
//! ```
//!
//! Brackets are optional but must be balanced. Items are separated by any
//! whitespace. An empty list (`""` or `"[]"`) yields no ids.

use crate::error::ItemId;
use thiserror::Error;

/// Why an id list could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdListError {
    #[error("unbalanced bracket")]
    UnbalancedBracket,

    #[error("invalid item id {0:?}")]
    InvalidId(String),
}

/// Parse an optionally bracket-delimited, whitespace-separated list of integers.
pub fn parse_id_list(text: &str) -> std::result::Result<Vec<ItemId>, IdListError> {
    let trimmed = text.trim();
    let inner = match (trimmed.strip_prefix('['), trimmed.ends_with(']')) {
        (Some(rest), true) => &rest[..rest.len() - 1],
        (None, false) => trimmed,
        _ => return Err(IdListError::UnbalancedBracket),
    };

    inner
        .split_whitespace()
        .map(parse_id)
        .collect()
}

/// Parse a single integer id token.
pub fn parse_id(token: &str) -> std::result::Result<ItemId, IdListError> {
    token
        .parse::<ItemId>()
        .map_err(|_| IdListError::InvalidId(token.to_string()))
}
