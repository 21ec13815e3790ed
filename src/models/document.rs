//! Document model representing one normalized bibliographic record.

use serde::{Deserialize, Serialize};

/// Placeholder used for every string field with no upstream value.
pub const PLACEHOLDER: &str = "N/A";

/// One author as reported by the abstract retrieval endpoint.
///
/// All name parts are optional upstream; [`AuthorRef::display_name`] picks
/// the best available form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    /// Given name (`ce:given-name`)
    pub given_name: Option<String>,

    /// Surname (`ce:surname`)
    pub surname: Option<String>,

    /// Indexed name, e.g. "Doe J." (`ce:indexed-name`)
    pub indexed_name: Option<String>,

    /// Whether this author is flagged as the corresponding author
    pub is_corresponding: bool,
}

impl AuthorRef {
    /// Best displayable name: indexed name, else "given surname", else placeholder.
    pub fn display_name(&self) -> String {
        if let Some(indexed) = &self.indexed_name {
            if !indexed.is_empty() {
                return indexed.clone();
            }
        }

        let composed = format!(
            "{} {}",
            self.given_name.as_deref().unwrap_or(""),
            self.surname.as_deref().unwrap_or("")
        );
        let composed = composed.trim();

        if composed.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            composed.to_string()
        }
    }
}

/// A fully resolved bibliographic record.
///
/// Every field always carries a value: strings fall back to [`PLACEHOLDER`]
/// and the citation count to zero, so sinks never have to deal with absent
/// data. Instances are built by the normalizer and treated as immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Elsevier EID, the record key
    pub eid: String,

    /// Document title
    pub title: String,

    /// Journal / publication name
    pub journal: String,

    /// Document type description (e.g. "Article", "Review")
    pub doc_type: String,

    /// Aggregation/source type (e.g. "Journal")
    pub source_type: String,

    /// Digital Object Identifier
    pub doi: String,

    /// Cover date (ISO format as delivered by the API)
    pub pub_date: String,

    /// Citation count
    pub citations: u32,

    /// Author names in publication order
    pub authors: Vec<String>,

    /// First author name
    pub first_author: String,

    /// Corresponding author name
    pub corresponding_author: String,

    /// Abstract text
    pub abstract_text: String,
}

impl Document {
    /// Create a record with the given key and placeholders everywhere else.
    pub fn new(eid: impl Into<String>) -> Self {
        Self {
            eid: eid.into(),
            title: PLACEHOLDER.to_string(),
            journal: PLACEHOLDER.to_string(),
            doc_type: PLACEHOLDER.to_string(),
            source_type: PLACEHOLDER.to_string(),
            doi: PLACEHOLDER.to_string(),
            pub_date: PLACEHOLDER.to_string(),
            citations: 0,
            authors: Vec::new(),
            first_author: PLACEHOLDER.to_string(),
            corresponding_author: PLACEHOLDER.to_string(),
            abstract_text: PLACEHOLDER.to_string(),
        }
    }

    /// Author list flattened for storage, semicolon-separated.
    pub fn authors_joined(&self) -> String {
        if self.authors.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            self.authors.join("; ")
        }
    }

    /// Publication year parsed from the cover date, if it is a valid ISO date.
    pub fn pub_year(&self) -> Option<i32> {
        use chrono::Datelike;
        chrono::NaiveDate::parse_from_str(&self.pub_date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }
}

/// Sort records by citation count, most cited first.
///
/// The sort is stable: records with equal counts keep their original
/// relative order.
pub fn sort_by_citations(documents: &mut [Document]) {
    documents.sort_by_key(|d| std::cmp::Reverse(d.citations));
}

/// Builder for constructing Document records field by field.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new builder keyed by EID
    pub fn new(eid: impl Into<String>) -> Self {
        Self {
            document: Document::new(eid),
        }
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.document.title = title.into();
        self
    }

    /// Set the journal name
    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.document.journal = journal.into();
        self
    }

    /// Set the document type
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.document.doc_type = doc_type.into();
        self
    }

    /// Set the source/aggregation type
    pub fn source_type(mut self, source_type: impl Into<String>) -> Self {
        self.document.source_type = source_type.into();
        self
    }

    /// Set the DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.document.doi = doi.into();
        self
    }

    /// Set the cover date
    pub fn pub_date(mut self, pub_date: impl Into<String>) -> Self {
        self.document.pub_date = pub_date.into();
        self
    }

    /// Set the citation count
    pub fn citations(mut self, citations: u32) -> Self {
        self.document.citations = citations;
        self
    }

    /// Set the author name list
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.document.authors = authors;
        self
    }

    /// Set the first author
    pub fn first_author(mut self, first_author: impl Into<String>) -> Self {
        self.document.first_author = first_author.into();
        self
    }

    /// Set the corresponding author
    pub fn corresponding_author(mut self, corresponding: impl Into<String>) -> Self {
        self.document.corresponding_author = corresponding.into();
        self
    }

    /// Set the abstract text
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.document.abstract_text = abstract_text.into();
        self
    }

    /// Build the Document
    pub fn build(self) -> Document {
        self.document
    }
}
