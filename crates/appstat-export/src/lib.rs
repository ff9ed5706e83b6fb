//! Bulk export of document collections to CSV
//!
//! Flattens every collection of a document store into one CSV file, the
//! format the appstat loader reads. The store is reached through the
//! [`DocumentSource`] trait; [`JsonDumpSource`] implements it over a
//! directory of JSON array dumps.

pub mod exporter;
pub mod source;
pub mod writer;

pub use exporter::{CollectionExporter, ExportPlan, ExportSummary};
pub use source::{CollectionPath, Document, DocumentSource, JsonDumpSource};
