//! Paginated author document search.
//!
//! The search endpoint delivers results in pages of at most
//! [`crate::models::MAX_PAGE_SIZE`] entries and declares the overall total
//! on every page. The loop here trusts the server-declared counts over any
//! local tally so the two cannot drift apart, and treats a failure mid-way
//! as the end of the batch rather than an error: whatever was accumulated
//! is returned as a partial result.

use serde::Deserialize;

use super::{ScopusClient, ScopusError};
use crate::models::{RawEntry, SearchOutcome, SearchQuery};
use crate::utils::ProgressReporter;

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(rename = "search-results")]
    results: Option<SearchResults>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResults {
    #[serde(rename = "opensearch:totalResults", default)]
    total_results: Option<String>,

    #[serde(rename = "opensearch:itemsPerPage", default)]
    items_per_page: Option<String>,

    #[serde(rename = "opensearch:startIndex", default)]
    start_index: Option<String>,

    #[serde(rename = "entry", default)]
    entries: Vec<RawEntry>,
}

/// The opensearch counters arrive as JSON strings; absent or malformed
/// values collapse to zero.
fn parse_count(value: &Option<String>) -> usize {
    value
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

impl ScopusClient {
    /// Fetch every search page for one author.
    ///
    /// Never returns an error: a transport/HTTP/parse failure terminates
    /// pagination and the accumulated prefix comes back with
    /// `complete == false`. Progress is reported after every page.
    pub async fn fetch_all(
        &self,
        query: &SearchQuery,
        progress: &ProgressReporter,
    ) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut start = query.start;

        // Treat the unknown total as 1 so the first request always goes out.
        let mut total_results = 1usize;

        while start < total_results {
            let url = format!(
                "{}/search/scopus?query={}&count={}&start={}",
                self.base_url,
                urlencoding::encode(&format!("AU-ID({})", query.author_id)),
                query.page_size,
                start
            );

            let page = match self.fetch_page(&url).await {
                Ok(page) => page,
                Err(err) => {
                    tracing::error!(
                        author_id = %query.author_id,
                        start,
                        error = %err,
                        "search page failed, returning partial results"
                    );
                    return outcome;
                }
            };

            let page_len = page.entries.len();
            outcome.entries.extend(page.entries);

            total_results = parse_count(&page.total_results);
            let items_per_page = parse_count(&page.items_per_page);
            let start_index = parse_count(&page.start_index);
            outcome.total_results = total_results;

            progress.set_total(total_results);
            progress.set(outcome.entries.len());
            tracing::debug!(
                fetched = outcome.entries.len(),
                total = total_results,
                "search page received"
            );

            // A page with no entries (or one that does not advance the
            // offset) would loop forever if the declared total is wrong;
            // stop instead and let the caller see a short batch.
            if page_len == 0 || items_per_page == 0 {
                if total_results > outcome.entries.len() {
                    tracing::warn!(
                        start,
                        total = total_results,
                        "empty search page before declared total, stopping"
                    );
                }
                break;
            }

            if start_index + items_per_page < total_results {
                start += items_per_page;
                tokio::time::sleep(self.page_delay).await;
            } else {
                break;
            }
        }

        outcome.complete = outcome.entries.len() >= outcome.total_results;
        outcome
    }

    async fn fetch_page(&self, url: &str) -> Result<SearchResults, ScopusError> {
        let response = self.request(url).send().await?;

        if !response.status().is_success() {
            return Err(ScopusError::Api(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let body: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| ScopusError::Parse(format!("search response: {}", e)))?;

        Ok(body.results.unwrap_or_default())
    }
}
