//! Core data models for bibliographic records and search operations.

mod document;
mod search;

pub use document::{sort_by_citations, AuthorRef, Document, DocumentBuilder, PLACEHOLDER};
pub use search::{RawEntry, SearchOutcome, SearchQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
