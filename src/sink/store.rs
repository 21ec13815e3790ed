//! Durable single-record storage.
//!
//! Keyed upsert into a SQLite `documents` table. The connection is opened
//! around each write and dropped immediately afterwards so concurrent
//! writers never contend for a long-held handle. Writes commit
//! individually and are never retried; the upsert is idempotent, so a
//! failed record can simply be written again later.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, Row, SqliteConnection};

use crate::models::{Document, PLACEHOLDER};

/// Default database filename.
pub const DEFAULT_DB_PATH: &str = "scopus_documents.db";

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    eid TEXT PRIMARY KEY,
    title TEXT,
    journal TEXT,
    doc_type TEXT,
    source_type TEXT,
    doi TEXT,
    pub_date TEXT,
    citation_count INTEGER,
    author_list TEXT,
    first_author TEXT,
    corresponding_author TEXT,
    abstract TEXT
)
"#;

const UPSERT_SQL: &str = r#"
INSERT OR REPLACE INTO documents (
    eid, title, journal, doc_type, source_type, doi, pub_date,
    citation_count, author_list, first_author, corresponding_author, abstract
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Errors from the durable sink
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not open or create the database
    #[error("failed to open database: {0}")]
    Connection(String),

    /// A statement failed
    #[error("database query failed: {0}")]
    Query(String),
}

/// SQLite-backed document store.
///
/// Holds only the path; every operation opens its own short-lived
/// connection.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    /// Create a store writing to the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", self.path.display()))
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .create_if_missing(true);

        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        sqlx::query(CREATE_TABLE_SQL)
            .execute(&mut conn)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(conn)
    }

    /// Insert or replace one record, committing immediately.
    pub async fn upsert(&self, doc: &Document) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;

        sqlx::query(UPSERT_SQL)
            .bind(&doc.eid)
            .bind(&doc.title)
            .bind(&doc.journal)
            .bind(&doc.doc_type)
            .bind(&doc.source_type)
            .bind(&doc.doi)
            .bind(&doc.pub_date)
            .bind(doc.citations as i64)
            .bind(doc.authors_joined())
            .bind(&doc.first_author)
            .bind(&doc.corresponding_author)
            .bind(&doc.abstract_text)
            .execute(&mut conn)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        tracing::debug!(eid = %doc.eid, "document stored");
        Ok(())
    }

    /// Look up one stored record by EID.
    pub async fn fetch(&self, eid: &str) -> Result<Option<Document>, StoreError> {
        let mut conn = self.connect().await?;

        let row = sqlx::query("SELECT * FROM documents WHERE eid = ?")
            .bind(eid)
            .fetch_optional(&mut conn)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(row.map(|row| {
            let author_list: String = row.get("author_list");
            let authors = if author_list == PLACEHOLDER || author_list.is_empty() {
                Vec::new()
            } else {
                author_list.split("; ").map(str::to_string).collect()
            };

            Document {
                eid: row.get("eid"),
                title: row.get("title"),
                journal: row.get("journal"),
                doc_type: row.get("doc_type"),
                source_type: row.get("source_type"),
                doi: row.get("doi"),
                pub_date: row.get("pub_date"),
                citations: row.get::<i64, _>("citation_count").max(0) as u32,
                authors,
                first_author: row.get("first_author"),
                corresponding_author: row.get("corresponding_author"),
                abstract_text: row.get("abstract"),
            }
        }))
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let mut conn = self.connect().await?;

        sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}
