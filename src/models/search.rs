//! Search request and result models.

use serde::{Deserialize, Serialize};

/// Hard upper bound the search endpoint accepts for `count`.
pub const MAX_PAGE_SIZE: usize = 100;

/// Default page size for author searches.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Parameters for one author search.
///
/// The author id and page size are fixed for the lifetime of a request;
/// only the start offset advances as pages are consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Scopus author id, e.g. "9736051900"
    pub author_id: String,

    /// Requested entries per page (clamped to [`MAX_PAGE_SIZE`])
    pub page_size: usize,

    /// Offset of the first entry to request
    pub start: usize,
}

impl SearchQuery {
    /// Create a query for the given author with defaults.
    pub fn new(author_id: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            start: 0,
        }
    }

    /// Set the page size, clamped to the API maximum.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// One entry of a search page, as delivered by the search endpoint.
///
/// Only the EID is relied upon; every other field may be absent and is
/// resolved by the normalizer. Citation counts arrive as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,

    #[serde(rename = "dc:title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        rename = "prism:publicationName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub publication_name: Option<String>,

    #[serde(rename = "prism:doi", default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(
        rename = "prism:coverDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_date: Option<String>,

    #[serde(
        rename = "citedby-count",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cited_by_count: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    #[serde(
        rename = "subtypeDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subtype_description: Option<String>,
}

impl RawEntry {
    /// Citation count parsed from the API's string form, zero when absent
    /// or malformed.
    pub fn citations(&self) -> u32 {
        self.cited_by_count
            .as_deref()
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Everything one `fetch_all` run produced.
///
/// `complete` is false when pagination stopped early on an error; the
/// accumulated prefix is still valid data (partial fetches are results,
/// not failures).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Entries accumulated across all fetched pages, in server order
    pub entries: Vec<RawEntry>,

    /// Most recent total declared by the server
    pub total_results: usize,

    /// Whether pagination ran to the declared end
    pub complete: bool,
}

impl SearchOutcome {
    /// True when the fetch stopped before reaching the declared total.
    pub fn is_partial(&self) -> bool {
        !self.complete
    }
}
