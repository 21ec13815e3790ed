//! End-to-end pipeline tests against a mock HTTP server.
//!
//! These drive the full flow: paginated search, per-entry abstract
//! retrieval, normalization, and both sinks.

use scopus_scout::config::CacheConfig;
use scopus_scout::models::{sort_by_citations, SearchQuery};
use scopus_scout::scopus::{fetch_author_documents, ScopusClient};
use scopus_scout::sink::{default_csv_filename, export_csv, DocumentStore};
use scopus_scout::utils::CacheService;
use std::time::Duration;

fn test_client(base_url: &str) -> ScopusClient {
    ScopusClient::new("test-key")
        .with_base_url(base_url)
        .with_delays(Duration::ZERO, Duration::ZERO)
}

fn page_body(total: usize, per_page: usize, start: usize, range: std::ops::Range<usize>) -> String {
    let entries: Vec<String> = range
        .map(|i| {
            format!(
                r#"{{"eid": "2-s2.0-{}", "dc:title": "Document {}", "prism:publicationName": "Journal {}", "citedby-count": "{}"}}"#,
                i,
                i,
                i % 3,
                i % 7
            )
        })
        .collect();

    format!(
        r#"{{"search-results": {{
            "opensearch:totalResults": "{}",
            "opensearch:itemsPerPage": "{}",
            "opensearch:startIndex": "{}",
            "entry": [{}]
        }}}}"#,
        total,
        per_page,
        start,
        entries.join(",")
    )
}

const ABSTRACT_BODY: &str = r#"{
    "abstracts-retrieval-response": {
        "coredata": {
            "dc:description": "An abstract.",
            "prism:aggregationType": "Journal"
        },
        "authors": {
            "author": [
                {"ce:indexed-name": "Doe J.", "@corresponding": "true"},
                {"ce:indexed-name": "Roe R."}
            ]
        }
    }
}"#;

#[tokio::test]
async fn test_thirty_documents_across_two_pages_into_both_sinks() {
    let mut server = mockito::Server::new_async().await;

    let page1 = server
        .mock("GET", "/search/scopus")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("query".into(), "AU-ID(777)".into()),
            mockito::Matcher::UrlEncoded("count".into(), "25".into()),
            mockito::Matcher::UrlEncoded("start".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(page_body(30, 25, 0, 0..25))
        .expect(1)
        .create_async()
        .await;

    let page2 = server
        .mock("GET", "/search/scopus")
        .match_query(mockito::Matcher::UrlEncoded("start".into(), "25".into()))
        .with_status(200)
        .with_body(page_body(30, 25, 25, 25..30))
        .expect(1)
        .create_async()
        .await;

    let abstracts = server
        .mock(
            "GET",
            mockito::Matcher::Regex(r"^/abstract/eid/2-s2\.0-\d+$".to_string()),
        )
        .with_status(200)
        .with_body(ABSTRACT_BODY)
        .expect(30)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let query = SearchQuery::new("777");
    let report = fetch_author_documents(&client, None, &query).await;

    page1.assert_async().await;
    page2.assert_async().await;
    abstracts.assert_async().await;

    assert_eq!(report.documents.len(), 30);
    assert_eq!(report.total_results, 30);
    assert!(report.complete);
    assert_eq!(report.missing_details, 0);

    // Detail fields made it through normalization
    let first = &report.documents[0];
    assert_eq!(first.abstract_text, "An abstract.");
    assert_eq!(first.first_author, "Doe J.");
    assert_eq!(first.corresponding_author, "Doe J.");
    assert_eq!(first.source_type, "Journal");

    let dir = tempfile::tempdir().unwrap();

    // Tabular sink: header plus one row per record, most cited first
    let mut documents = report.documents.clone();
    sort_by_citations(&mut documents);
    assert!(documents.windows(2).all(|w| w[0].citations >= w[1].citations));

    let csv_path = dir.path().join(default_csv_filename("777"));
    export_csv(&csv_path, &documents).unwrap();
    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 31);

    // Durable sink: every record keyed by EID exactly once
    let store = DocumentStore::new(dir.path().join("docs.db"));
    for doc in &documents {
        store.upsert(doc).await.unwrap();
    }
    assert_eq!(store.count().await.unwrap(), 30);

    let stored = store.fetch("2-s2.0-29").await.unwrap().unwrap();
    assert_eq!(stored.title, "Document 29");
}

#[tokio::test]
async fn test_repeated_fetch_within_window_is_served_from_cache() {
    let mut server = mockito::Server::new_async().await;

    let page = server
        .mock("GET", "/search/scopus")
        .match_query(mockito::Matcher::UrlEncoded("start".into(), "0".into()))
        .with_status(200)
        .with_body(page_body(5, 25, 0, 0..5))
        .expect(1)
        .create_async()
        .await;

    let abstracts = server
        .mock(
            "GET",
            mockito::Matcher::Regex(r"^/abstract/eid/2-s2\.0-\d+$".to_string()),
        )
        .with_status(200)
        .with_body(ABSTRACT_BODY)
        .expect(5)
        .create_async()
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = CacheService::from_config(CacheConfig {
        enabled: true,
        directory: Some(cache_dir.path().to_path_buf()),
        search_ttl_seconds: 3600,
        abstract_ttl_seconds: 3600,
    });
    cache.initialize().unwrap();

    let client = test_client(&server.url());
    let query = SearchQuery::new("777");

    let first = fetch_author_documents(&client, Some(&cache), &query).await;
    let second = fetch_author_documents(&client, Some(&cache), &query).await;

    // The second batch issued no HTTP requests at all
    page.assert_async().await;
    abstracts.assert_async().await;

    assert_eq!(first.documents.len(), 5);
    assert_eq!(second.documents.len(), 5);
    assert_eq!(first.documents, second.documents);
}

#[tokio::test]
async fn test_partial_fetch_still_reaches_the_sinks() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/search/scopus")
        .match_query(mockito::Matcher::UrlEncoded("start".into(), "0".into()))
        .with_status(200)
        .with_body(page_body(50, 25, 0, 0..25))
        .expect(1)
        .create_async()
        .await;

    server
        .mock("GET", "/search/scopus")
        .match_query(mockito::Matcher::UrlEncoded("start".into(), "25".into()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    server
        .mock(
            "GET",
            mockito::Matcher::Regex(r"^/abstract/eid/2-s2\.0-\d+$".to_string()),
        )
        .with_status(200)
        .with_body(ABSTRACT_BODY)
        .expect(25)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let report = fetch_author_documents(&client, None, &SearchQuery::new("777")).await;

    // Partial data is still data
    assert_eq!(report.documents.len(), 25);
    assert_eq!(report.total_results, 50);
    assert!(!report.complete);

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("partial.csv");
    export_csv(&csv_path, &report.documents).unwrap();
    assert_eq!(
        std::fs::read_to_string(&csv_path).unwrap().lines().count(),
        26
    );
}
