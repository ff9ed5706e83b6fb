//! Union-header CSV writer
//!
//! The header of a collection is the union of the field names of all its
//! documents, in first-seen order. A document lacking a field gets a blank
//! cell; nested arrays and objects are written as compact JSON. Files start
//! with a UTF-8 BOM so spreadsheet tools detect the encoding.

use crate::source::Document;
use appstat_core::error::{AppstatError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Union of field names in first-seen order
pub fn union_header(documents: &[Document]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for doc in documents {
        for key in doc.keys() {
            if !header.iter().any(|h| h == key) {
                header.push(key.clone());
            }
        }
    }
    header
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

/// Render documents as CSV bytes, BOM included
pub fn render_csv(documents: &[Document]) -> Result<Vec<u8>> {
    let header = union_header(documents);

    let mut writer = csv::Writer::from_writer(BOM.to_vec());
    writer.write_record(&header)?;
    for doc in documents {
        writer.write_record(header.iter().map(|field| cell(doc.get(field))))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppstatError::Export(format!("failed to flush CSV: {e}")))
}

/// Write `<out_dir>/<name>.csv`; an empty collection writes nothing
pub async fn write_collection(
    out_dir: &Path,
    name: &str,
    documents: &[Document],
) -> Result<Option<PathBuf>> {
    if documents.is_empty() {
        return Ok(None);
    }

    let path = out_dir.join(format!("{name}.csv"));
    let bytes = render_csv(documents)?;
    tokio::fs::write(&path, bytes).await?;
    Ok(Some(path))
}
