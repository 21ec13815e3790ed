//! # scopus-scout
//!
//! Fetch, inspect and archive an author's Scopus publication record.
//!
//! ## Architecture
//!
//! - [`scopus`]: API client — paginated search, abstract retrieval,
//!   author metrics — and the record normalizer
//! - [`models`]: core data structures ([`Document`], search types)
//! - [`sink`]: CSV export and the SQLite document store
//! - [`utils`]: response cache, HTTP client, progress, display helpers
//! - [`config`]: configuration management
//! - [`ui`]: styled terminal output

pub mod config;
pub mod models;
pub mod scopus;
pub mod sink;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::Document;
pub use scopus::{fetch_author_documents, FetchReport, ScopusClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
