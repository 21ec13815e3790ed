//! Scopus API client.
//!
//! One client covers the three endpoints this tool consumes: the paginated
//! document search, the per-document abstract retrieval, and the author
//! metrics lookup. Errors below this boundary are absorbed into partial
//! results or empty records; callers never see a failed batch.

mod abstracts;
mod author;
mod normalize;
mod search;

pub use abstracts::AbstractDetail;
pub use normalize::normalize;

use std::time::Duration;

use crate::config::Config;
use crate::models::{Document, SearchQuery};
use crate::utils::{CacheResult, CacheService, HttpClient, ProgressReporter};

/// Production API base URL.
pub const SCOPUS_API_BASE: &str = "https://api.elsevier.com/content";

/// Delay between consecutive search page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(1000);

/// Delay after each successful abstract retrieval.
pub const DEFAULT_ABSTRACT_DELAY: Duration = Duration::from_millis(500);

/// Client for the Scopus REST endpoints.
#[derive(Debug, Clone)]
pub struct ScopusClient {
    http: HttpClient,
    api_key: String,
    base_url: String,
    page_delay: Duration,
    abstract_delay: Duration,
}

impl ScopusClient {
    /// Create a client talking to the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            api_key: api_key.into(),
            base_url: SCOPUS_API_BASE.to_string(),
            page_delay: DEFAULT_PAGE_DELAY,
            abstract_delay: DEFAULT_ABSTRACT_DELAY,
        }
    }

    /// Create a client with the key and delays from configuration.
    ///
    /// Returns `None` when no API key is configured; a missing credential
    /// is a startup error, not something to discover mid-batch.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.api.key.clone()?;
        Some(Self::new(api_key).with_delays(
            Duration::from_millis(config.rate_limits.page_delay_ms),
            Duration::from_millis(config.rate_limits.abstract_delay_ms),
        ))
    }

    /// Point the client at a different base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the courtesy delays.
    pub fn with_delays(mut self, page_delay: Duration, abstract_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self.abstract_delay = abstract_delay;
        self
    }

    /// Build a GET request with the credential and accept headers applied.
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .client()
            .get(url)
            .header("X-ELS-APIKey", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

/// Errors from one request against the upstream API.
#[derive(Debug, thiserror::Error)]
pub enum ScopusError {
    /// Network or transport error
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ScopusError {
    fn from(err: reqwest::Error) -> Self {
        ScopusError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ScopusError {
    fn from(err: serde_json::Error) -> Self {
        ScopusError::Parse(format!("JSON: {}", err))
    }
}

/// Result of one full author fetch: the normalized records plus enough
/// state for the caller to tell a partial batch from a complete one.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Normalized records in server order
    pub documents: Vec<Document>,

    /// Total the server declared for this author
    pub total_results: usize,

    /// Whether pagination reached the declared total
    pub complete: bool,

    /// Entries for which no abstract detail could be retrieved
    pub missing_details: usize,
}

/// Fetch, enrich and normalize every document of one author.
///
/// Drives the paginated search, then retrieves abstract details one entry
/// at a time in entry order, and normalizes each pair into a [`Document`].
/// Both tiers consult the cache first when one is supplied; only complete
/// search outcomes and non-empty details are written back.
///
/// This function does not fail: a mid-pagination error yields the pages
/// fetched so far (`complete == false`), and a failed detail lookup yields
/// a record without abstract data.
pub async fn fetch_author_documents(
    client: &ScopusClient,
    cache: Option<&CacheService>,
    query: &SearchQuery,
) -> FetchReport {
    let outcome = match cache.map(|c| c.get_search(query)) {
        Some(CacheResult::Hit(outcome)) => {
            tracing::debug!(author_id = %query.author_id, "search served from cache");
            outcome
        }
        _ => {
            let progress = ProgressReporter::new("Fetching documents", 0);
            let outcome = client.fetch_all(query, &progress).await;
            progress.finish();

            if outcome.complete {
                if let Some(c) = cache {
                    c.set_search(query, &outcome);
                }
            }
            outcome
        }
    };

    let progress = ProgressReporter::new("Fetching abstracts", outcome.entries.len());
    let mut documents = Vec::with_capacity(outcome.entries.len());
    let mut missing_details = 0;

    for entry in &outcome.entries {
        let detail = match entry.eid.as_deref() {
            Some(eid) => match cache.map(|c| c.get_abstract(eid)) {
                Some(CacheResult::Hit(detail)) => detail,
                _ => {
                    let detail = client.fetch_abstract(eid).await;
                    if !detail.is_empty() {
                        if let Some(c) = cache {
                            c.set_abstract(eid, &detail);
                        }
                    }
                    detail
                }
            },
            None => AbstractDetail::default(),
        };

        if detail.is_empty() {
            missing_details += 1;
        }

        documents.push(normalize(entry, &detail));
        progress.inc();
    }
    progress.finish();

    FetchReport {
        documents,
        total_results: outcome.total_results,
        complete: outcome.complete,
        missing_details,
    }
}
