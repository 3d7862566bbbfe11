//! CSV export of the ledger.
//!
//! The document starts with a UTF-8 byte-order mark so spreadsheet tools
//! detect the encoding, followed by a `date,description,amount` header and
//! one row per entry. Descriptions are always quoted; amounts never are.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::models::Entry;

pub const BOM: char = '\u{feff}';

pub const HEADER: &str = "date,description,amount";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("There are no records to export")]
    Empty,

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read export: {0}")]
    Parse(#[from] csv::Error),
}

/// One data row read back from an export
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportRow {
    pub date: String,
    pub description: String,
    pub amount: f64,
}

/// Quote a field, doubling any embedded quotes.
/// `csv::Writer` quoting is all-or-nothing per writer, and only the
/// description column is quoted here.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn to_csv(entries: &[Entry]) -> Result<String, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut out = String::new();
    out.push(BOM);
    out.push_str(HEADER);
    out.push('\n');

    for entry in entries {
        out.push_str(&format!(
            "{},{},{}\n",
            entry.date_display(),
            quote(&entry.description),
            entry.amount
        ));
    }

    Ok(out)
}

/// Export file name for a given day, e.g. `ledger_20260314.csv`
pub fn file_name(date: NaiveDate) -> String {
    format!("ledger_{}.csv", date.format("%Y%m%d"))
}

/// Write the export into `dir`, returning the path of the new file
pub fn write_csv(dir: &Path, entries: &[Entry], date: NaiveDate) -> Result<PathBuf, ExportError> {
    let contents = to_csv(entries)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(date));
    std::fs::write(&path, contents)?;

    info!(?path, rows = entries.len(), "Ledger exported");
    Ok(path)
}

/// Read an export back into rows
pub fn parse_csv(text: &str) -> Result<Vec<ExportRow>, ExportError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let rows = reader.deserialize().collect::<Result<Vec<ExportRow>, _>>()?;
    Ok(rows)
}
