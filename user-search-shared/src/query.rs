//! Search query and result page types.

use serde::{Deserialize, Serialize};

use crate::record::UserRecord;

/// Number of records returned per `/search` page.
pub const SEARCH_PAGE_SIZE: usize = 15;

/// Which records a query selects.
///
/// An empty or absent query selects everything; any other text, whitespace
/// included, is passed to the engine as-is and matched against all four
/// record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Every record in the index.
    All,
    /// Records matching the given text.
    Text(String),
}

impl RecordFilter {
    /// Build a filter from optional user input. Only `None` or `""` match all.
    pub fn from_input(query: Option<&str>) -> Self {
        match query {
            Some(text) if !text.is_empty() => Self::Text(text.to_string()),
            _ => Self::All,
        }
    }

    /// The query text, if the filter is not match-all.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// A paginated, relevance-ranked search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// What to match.
    pub filter: RecordFilter,
    /// 1-based page number.
    pub page: u32,
}

impl SearchQuery {
    /// Create a query from optional user input and a 1-based page number.
    pub fn new(query: Option<&str>, page: u32) -> Self {
        Self {
            filter: RecordFilter::from_input(query),
            page,
        }
    }

    /// Match every record.
    pub fn all(page: u32) -> Self {
        Self {
            filter: RecordFilter::All,
            page,
        }
    }

    /// Fuzzy-match the given text.
    pub fn text(query: impl AsRef<str>, page: u32) -> Self {
        Self::new(Some(query.as_ref()), page)
    }

    /// Number of records per page.
    pub fn size(&self) -> usize {
        SEARCH_PAGE_SIZE
    }

    /// Offset of the first record of this page.
    pub fn from_offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * SEARCH_PAGE_SIZE
    }
}

/// One page of search results.
///
/// `total` is the match count reported by the engine. For large result sets
/// the engine may stop counting early, so it can be a lower bound.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchPage {
    /// Number of matching records as reported by the engine.
    pub total: u64,
    /// Records on this page, in engine order.
    pub results: Vec<UserRecord>,
}

impl SearchPage {
    /// A page with no matches.
    pub fn empty() -> Self {
        Self::default()
    }
}
