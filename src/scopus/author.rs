//! Author-level metrics lookup.

use serde::Deserialize;

use super::{ScopusClient, ScopusError};
use crate::models::PLACEHOLDER;

#[derive(Debug, Deserialize)]
struct AuthorResponseBody {
    #[serde(rename = "author-retrieval-response", default)]
    response: Vec<AuthorMetrics>,
}

#[derive(Debug, Deserialize)]
struct AuthorMetrics {
    /// Opaque; the API has delivered both string and numeric forms
    #[serde(rename = "h-index", default)]
    h_index: Option<serde_json::Value>,
}

impl ScopusClient {
    /// Fetch the author's h-index as an opaque display value.
    ///
    /// Any failure resolves to the placeholder; metrics are decoration,
    /// never a reason to abort a fetch.
    pub async fn fetch_h_index(&self, author_id: &str) -> String {
        match self.try_fetch_h_index(author_id).await {
            Ok(Some(value)) => value,
            Ok(None) => PLACEHOLDER.to_string(),
            Err(err) => {
                tracing::warn!(author_id, error = %err, "could not fetch h-index");
                PLACEHOLDER.to_string()
            }
        }
    }

    async fn try_fetch_h_index(&self, author_id: &str) -> Result<Option<String>, ScopusError> {
        let url = format!(
            "{}/author/author_id/{}?view=metrics",
            self.base_url,
            urlencoding::encode(author_id)
        );

        let response = self.request(&url).send().await?;

        if !response.status().is_success() {
            return Err(ScopusError::Api(format!(
                "author metrics returned status {}",
                response.status()
            )));
        }

        let body: AuthorResponseBody = response
            .json()
            .await
            .map_err(|e| ScopusError::Parse(format!("author response: {}", e)))?;

        Ok(body
            .response
            .first()
            .and_then(|m| m.h_index.as_ref())
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_client(base_url: &str) -> ScopusClient {
        ScopusClient::new("test-key")
            .with_base_url(base_url)
            .with_delays(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_h_index_string_form() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/author/author_id/123")
            .match_query(mockito::Matcher::UrlEncoded("view".into(), "metrics".into()))
            .with_status(200)
            .with_body(r#"{"author-retrieval-response": [{"h-index": "14"}]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.fetch_h_index("123").await, "14");
    }

    #[tokio::test]
    async fn test_h_index_numeric_form() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/author/author_id/123")
            .match_query(mockito::Matcher::UrlEncoded("view".into(), "metrics".into()))
            .with_status(200)
            .with_body(r#"{"author-retrieval-response": [{"h-index": 14}]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.fetch_h_index("123").await, "14");
    }

    #[tokio::test]
    async fn test_h_index_failure_is_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/author/author_id/123")
            .match_query(mockito::Matcher::UrlEncoded("view".into(), "metrics".into()))
            .with_status(401)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.fetch_h_index("123").await, PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_h_index_missing_in_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/author/author_id/123")
            .match_query(mockito::Matcher::UrlEncoded("view".into(), "metrics".into()))
            .with_status(200)
            .with_body(r#"{"author-retrieval-response": []}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.fetch_h_index("123").await, PLACEHOLDER);
    }
}
