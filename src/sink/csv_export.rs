//! CSV export of a batch of normalized records.

use std::path::Path;

use crate::models::Document;

/// Header row; one display name per [`Document`] field.
pub const CSV_HEADERS: [&str; 12] = [
    "EID",
    "Title",
    "Journal Name",
    "Published Date",
    "Citations",
    "Document Type",
    "Source Type",
    "DOI",
    "Authors",
    "First Author",
    "Corresponding Author",
    "Abstract",
];

/// Default export filename for one author's publication list.
pub fn default_csv_filename(author_id: &str) -> String {
    format!("scopus_publications_{}.csv", author_id)
}

/// Write the batch to a CSV file, one row per record plus a header row.
///
/// Values are quoted per standard CSV rules by the writer; the author
/// list is flattened to a single delimited column. Records are written
/// in the order given, so sort before calling if an order is wanted.
pub fn export_csv(path: &Path, documents: &[Document]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;

    writer.write_record(CSV_HEADERS)?;

    for doc in documents {
        writer.write_record(&[
            doc.eid.clone(),
            doc.title.clone(),
            doc.journal.clone(),
            doc.pub_date.clone(),
            doc.citations.to_string(),
            doc.doc_type.clone(),
            doc.source_type.clone(),
            doc.doi.clone(),
            doc.authors_joined(),
            doc.first_author.clone(),
            doc.corresponding_author.clone(),
            doc.abstract_text.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
