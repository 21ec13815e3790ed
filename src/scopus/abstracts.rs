//! Per-document abstract retrieval.
//!
//! One request per EID, issued sequentially in entry order. A failure here
//! never aborts the batch: the affected record simply goes without abstract
//! data and a warning is logged.

use serde::{Deserialize, Serialize};

use super::{ScopusClient, ScopusError};
use crate::models::AuthorRef;

#[derive(Debug, Deserialize)]
struct AbstractResponseBody {
    #[serde(rename = "abstracts-retrieval-response")]
    response: Option<AbstractDetail>,
}

/// Abstract and author details for one document.
///
/// `Default` is the empty detail record, returned for any failed lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractDetail {
    #[serde(default)]
    pub coredata: Coredata,

    #[serde(default)]
    pub authors: AuthorGroup,
}

/// `coredata` block of the abstract retrieval response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coredata {
    #[serde(rename = "dc:title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        rename = "dc:description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Some responses carry the abstract under a plain key instead
    #[serde(
        rename = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub plain_description: Option<String>,

    #[serde(
        rename = "prism:publicationName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub publication_name: Option<String>,

    #[serde(
        rename = "prism:aggregationType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aggregation_type: Option<String>,

    #[serde(
        rename = "subtypeDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subtype_description: Option<String>,

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
}

/// `authors` block wrapping the author array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorGroup {
    #[serde(default)]
    pub author: Vec<WireAuthor>,
}

/// One author as delivered on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAuthor {
    #[serde(
        rename = "ce:given-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub given_name: Option<String>,

    #[serde(rename = "ce:surname", default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,

    #[serde(
        rename = "ce:indexed-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub indexed_name: Option<String>,

    /// Correspondence flag; the attribute name varies across responses
    #[serde(
        rename = "@corresponding",
        alias = "@correspondence",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub corresponding: Option<String>,
}

/// The flag is truthy under either of the two spellings the API uses.
fn is_corresponding_flag(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

impl WireAuthor {
    fn to_author_ref(&self) -> AuthorRef {
        AuthorRef {
            given_name: self.given_name.clone(),
            surname: self.surname.clone(),
            indexed_name: self.indexed_name.clone(),
            is_corresponding: is_corresponding_flag(&self.corresponding),
        }
    }
}

impl AbstractDetail {
    /// Authors in publication order with the canonical correspondence flag.
    pub fn author_refs(&self) -> Vec<AuthorRef> {
        self.authors.author.iter().map(|a| a.to_author_ref()).collect()
    }

    /// Abstract text under whichever key the response used.
    pub fn abstract_text(&self) -> Option<&str> {
        self.coredata
            .description
            .as_deref()
            .or(self.coredata.plain_description.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// True for the empty detail record.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ScopusClient {
    /// Fetch abstract and author details for one EID.
    ///
    /// Failures of any kind are absorbed: a warning is logged and the
    /// empty detail record comes back, so the caller's batch continues.
    /// A shorter courtesy delay than the page delay follows each
    /// successful call.
    pub async fn fetch_abstract(&self, eid: &str) -> AbstractDetail {
        match self.try_fetch_abstract(eid).await {
            Ok(detail) => {
                tokio::time::sleep(self.abstract_delay).await;
                detail
            }
            Err(err) => {
                tracing::warn!(eid, error = %err, "could not fetch abstract, continuing without it");
                AbstractDetail::default()
            }
        }
    }

    async fn try_fetch_abstract(&self, eid: &str) -> Result<AbstractDetail, ScopusError> {
        let url = format!(
            "{}/abstract/eid/{}",
            self.base_url,
            urlencoding::encode(eid)
        );

        let response = self.request(&url).send().await?;

        if !response.status().is_success() {
            return Err(ScopusError::Api(format!(
                "abstract retrieval returned status {}",
                response.status()
            )));
        }

        let body: AbstractResponseBody = response
            .json()
            .await
            .map_err(|e| ScopusError::Parse(format!("abstract response: {}", e)))?;

        Ok(body.response.unwrap_or_default())
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

    const BODY: &str = r#"{
        "abstracts-retrieval-response": {
            "coredata": {
                "dc:title": "A Study",
                "dc:description": "We study things.",
                "prism:aggregationType": "Journal",
                "citedby-count": "12"
            },
            "authors": {
                "author": [
                    {"ce:indexed-name": "Doe J.", "@corresponding": "true"},
                    {"ce:given-name": "Rae", "ce:surname": "Roe"}
                ]
            }
        }
    }"#;

    #[tokio::test]
    async fn test_fetch_abstract_parses_detail() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/abstract/eid/2-s2.0-1")
            .match_header("x-els-apikey", "test-key")
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let detail = client.fetch_abstract("2-s2.0-1").await;

        mock.assert_async().await;
        assert!(!detail.is_empty());
        assert_eq!(detail.abstract_text(), Some("We study things."));

        let authors = detail.author_refs();
        assert_eq!(authors.len(), 2);
        assert!(authors[0].is_corresponding);
        assert_eq!(authors[0].display_name(), "Doe J.");
        assert!(!authors[1].is_corresponding);
        assert_eq!(authors[1].display_name(), "Rae Roe");
    }

    #[tokio::test]
    async fn test_fetch_abstract_absorbs_http_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/abstract/eid/2-s2.0-404")
            .with_status(404)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let detail = client.fetch_abstract("2-s2.0-404").await;

        mock.assert_async().await;
        assert!(detail.is_empty());
        assert_eq!(detail.abstract_text(), None);
        assert!(detail.author_refs().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_abstract_absorbs_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/abstract/eid/2-s2.0-9")
            .with_status(200)
            .with_body("this is not json")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let detail = client.fetch_abstract("2-s2.0-9").await;

        assert!(detail.is_empty());
    }

    #[test]
    fn test_corresponding_flag_forms() {
        for truthy in ["true", "TRUE", "yes", "Yes"] {
            assert!(is_corresponding_flag(&Some(truthy.to_string())), "{truthy}");
        }
        for falsy in ["false", "no", "1", ""] {
            assert!(!is_corresponding_flag(&Some(falsy.to_string())), "{falsy}");
        }
        assert!(!is_corresponding_flag(&None));
    }

    #[test]
    fn test_correspondence_alias_key() {
        let author: WireAuthor =
            serde_json::from_str(r#"{"ce:surname": "Doe", "@correspondence": "yes"}"#).unwrap();
        assert!(author.to_author_ref().is_corresponding);
    }

    #[test]
    fn test_plain_description_fallback() {
        let detail: AbstractDetail = serde_json::from_str(
            r#"{"coredata": {"description": "Fallback text."}, "authors": {}}"#,
        )
        .unwrap();
        assert_eq!(detail.abstract_text(), Some("Fallback text."));
    }
}
