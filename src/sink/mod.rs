//! Result sinks consuming normalized records.
//!
//! Two independent sinks sharing no state: bulk CSV export and a keyed
//! SQLite store. Either can be pointed at the same batch; the table
//! rendering in the CLI is the third consumer.

mod csv_export;
mod store;

pub use csv_export::{default_csv_filename, export_csv, CSV_HEADERS};
pub use store::{DocumentStore, StoreError, DEFAULT_DB_PATH};
