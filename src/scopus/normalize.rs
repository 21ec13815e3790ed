//! Normalization of one raw search entry plus its optional abstract
//! detail into a flat [`Document`].
//!
//! Pure and total: any combination of inputs, including fully empty ones,
//! produces a record with every field resolved. Detail fields win over the
//! search entry's summary fields; whatever is absent on both sides gets
//! the placeholder.

use crate::models::{Document, DocumentBuilder, RawEntry, PLACEHOLDER};

use super::AbstractDetail;

/// First non-empty candidate, or the placeholder.
fn resolve(preferred: Option<&str>, fallback: Option<&str>) -> String {
    [preferred, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

/// Build the normalized record for one entry.
pub fn normalize(entry: &RawEntry, detail: &AbstractDetail) -> Document {
    let authors = detail.author_refs();
    let author_names: Vec<String> = authors.iter().map(|a| a.display_name()).collect();

    let first_author = author_names
        .first()
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let corresponding_author = authors
        .iter()
        .find(|a| a.is_corresponding)
        .map(|a| a.display_name())
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let citations = detail
        .coredata
        .cited_by_count
        .as_deref()
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or_else(|| entry.citations());

    DocumentBuilder::new(resolve(entry.eid.as_deref(), None))
        .title(resolve(
            detail.coredata.title.as_deref(),
            entry.title.as_deref(),
        ))
        .journal(resolve(
            detail.coredata.publication_name.as_deref(),
            entry.publication_name.as_deref(),
        ))
        .doc_type(resolve(
            detail.coredata.subtype_description.as_deref(),
            entry.subtype_description.as_deref(),
        ))
        .source_type(resolve(
            detail.coredata.aggregation_type.as_deref(),
            entry.subtype.as_deref(),
        ))
        .doi(resolve(detail.coredata.doi.as_deref(), entry.doi.as_deref()))
        .pub_date(resolve(
            detail.coredata.cover_date.as_deref(),
            entry.cover_date.as_deref(),
        ))
        .citations(citations)
        .authors(author_names)
        .first_author(first_author)
        .corresponding_author(corresponding_author)
        .abstract_text(resolve(detail.abstract_text(), None))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_from(json: &str) -> AbstractDetail {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_inputs_yield_all_placeholders() {
        let doc = normalize(&RawEntry::default(), &AbstractDetail::default());

        assert_eq!(doc.eid, PLACEHOLDER);
        assert_eq!(doc.title, PLACEHOLDER);
        assert_eq!(doc.journal, PLACEHOLDER);
        assert_eq!(doc.doc_type, PLACEHOLDER);
        assert_eq!(doc.source_type, PLACEHOLDER);
        assert_eq!(doc.doi, PLACEHOLDER);
        assert_eq!(doc.pub_date, PLACEHOLDER);
        assert_eq!(doc.citations, 0);
        assert!(doc.authors.is_empty());
        assert_eq!(doc.first_author, PLACEHOLDER);
        assert_eq!(doc.corresponding_author, PLACEHOLDER);
        assert_eq!(doc.abstract_text, PLACEHOLDER);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let entry: RawEntry =
            serde_json::from_str(r#"{"eid": "2-s2.0-1", "dc:title": "T"}"#).unwrap();
        let detail = AbstractDetail::default();

        assert_eq!(normalize(&entry, &detail), normalize(&entry, &detail));
    }

    #[test]
    fn test_detail_fields_win_over_entry_fields() {
        let entry: RawEntry = serde_json::from_str(
            r#"{
                "eid": "2-s2.0-1",
                "dc:title": "Summary Title",
                "prism:publicationName": "Summary Journal",
                "citedby-count": "5"
            }"#,
        )
        .unwrap();

        let detail = detail_from(
            r#"{
                "coredata": {
                    "dc:title": "Full Title",
                    "prism:publicationName": "Full Journal",
                    "citedby-count": "9"
                },
                "authors": {}
            }"#,
        );

        let doc = normalize(&entry, &detail);
        assert_eq!(doc.title, "Full Title");
        assert_eq!(doc.journal, "Full Journal");
        assert_eq!(doc.citations, 9);
    }

    #[test]
    fn test_entry_fields_fill_in_when_detail_is_empty() {
        let entry: RawEntry = serde_json::from_str(
            r#"{
                "eid": "2-s2.0-1",
                "dc:title": "Summary Title",
                "prism:publicationName": "Summary Journal",
                "prism:coverDate": "2020-01-15",
                "citedby-count": "5",
                "subtype": "ar",
                "subtypeDescription": "Article"
            }"#,
        )
        .unwrap();

        let doc = normalize(&entry, &AbstractDetail::default());
        assert_eq!(doc.title, "Summary Title");
        assert_eq!(doc.journal, "Summary Journal");
        assert_eq!(doc.pub_date, "2020-01-15");
        assert_eq!(doc.citations, 5);
        assert_eq!(doc.doc_type, "Article");
        assert_eq!(doc.source_type, "ar");
        assert_eq!(doc.abstract_text, PLACEHOLDER);
    }

    #[test]
    fn test_author_resolution() {
        let detail = detail_from(
            r#"{
                "coredata": {},
                "authors": {
                    "author": [
                        {"ce:indexed-name": "First F."},
                        {"ce:indexed-name": "Middle M.", "@corresponding": "TRUE"},
                        {"ce:indexed-name": "Last L.", "@corresponding": "true"}
                    ]
                }
            }"#,
        );

        let doc = normalize(&RawEntry::default(), &detail);
        assert_eq!(doc.authors, vec!["First F.", "Middle M.", "Last L."]);
        assert_eq!(doc.first_author, "First F.");
        // First flagged author wins, case-insensitively.
        assert_eq!(doc.corresponding_author, "Middle M.");
    }

    #[test]
    fn test_no_corresponding_author_flagged() {
        let detail = detail_from(
            r#"{
                "coredata": {},
                "authors": {"author": [{"ce:indexed-name": "Only O."}]}
            }"#,
        );

        let doc = normalize(&RawEntry::default(), &detail);
        assert_eq!(doc.first_author, "Only O.");
        assert_eq!(doc.corresponding_author, PLACEHOLDER);
    }

    #[test]
    fn test_blank_strings_resolve_to_placeholder() {
        let entry: RawEntry =
            serde_json::from_str(r#"{"eid": "2-s2.0-1", "dc:title": "   "}"#).unwrap();
        let doc = normalize(&entry, &AbstractDetail::default());
        assert_eq!(doc.title, PLACEHOLDER);
    }
}
