//! JSON and CSV import/export of record collections.
//!
//! CSV here is the simple comma-split dialect the portal pages exchange:
//! a header row, no quoting and no escaping of embedded commas or quotes.

use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use portal_domain::{Record, Row};

use crate::error::{ImportError, StorageError};

/// File formats accepted by import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Detect the format from a file name's extension.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(ImportFormat::Json),
            "csv" => Ok(ImportFormat::Csv),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// File formats produced by export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Download name, e.g. `parties-export.csv`.
    pub fn file_name(&self, entity: &str) -> String {
        format!("{}-export.{}", entity, self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Parse an import file into raw rows.
pub fn parse_rows(text: &str, format: ImportFormat) -> Result<Vec<Row>, ImportError> {
    let rows = match format {
        ImportFormat::Json => parse_json_rows(text)?,
        ImportFormat::Csv => parse_csv_rows(text)?,
    };
    debug!(?format, rows = rows.len(), "Parsed import file");
    Ok(rows)
}

/// A JSON array of objects.
pub fn parse_json_rows(text: &str) -> Result<Vec<Row>, ImportError> {
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(ImportError::NotAnArray);
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            _ => Err(ImportError::NotAnArray),
        })
        .collect()
}

/// Header row plus comma-split data rows.
///
/// Cells are trimmed; empty cells are left out of the row, `true`/`false`
/// become booleans and everything else stays text. Blank lines are skipped,
/// short rows simply lack the trailing fields and extra cells are ignored.
pub fn parse_csv_rows(text: &str) -> Result<Vec<Row>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::Csv("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, cell)| !header.is_empty() && !cell.is_empty())
            .map(|(header, cell)| (header.clone(), csv_value(cell)))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn csv_value(cell: &str) -> Value {
    if cell.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else {
        Value::String(cell.to_string())
    }
}

/// Serialize records in the requested format.
pub fn export<T: Record>(records: &[&T], format: ExportFormat) -> Result<String, StorageError> {
    match format {
        ExportFormat::Json => export_json(records),
        ExportFormat::Csv => export_csv(records),
    }
}

/// Pretty-printed JSON array.
pub fn export_json<T: Record>(records: &[&T]) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Header plus one line per record, comma-joined without escaping.
///
/// Columns are the scalar fields of the first record, in field order.
/// Nested values (comment lists, signatures) are not exported. An empty
/// view exports as an empty string.
pub fn export_csv<T: Record>(records: &[&T]) -> Result<String, StorageError> {
    let rows = records
        .iter()
        .map(|r| r.to_row())
        .collect::<Result<Vec<Row>, _>>()?;

    let Some(first) = rows.first() else {
        return Ok(String::new());
    };

    let headers: Vec<&String> = first
        .iter()
        .filter(|(_, value)| is_scalar(value))
        .map(|(key, _)| key)
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers.iter().map(|h| h.as_str())).map_err(csv_error)?;
    for row in &rows {
        writer
            .write_record(headers.iter().map(|h| cell_text(row.get(h.as_str()))))
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Serialize(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| StorageError::Serialize(e.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Bool(_) | Value::Number(_))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn csv_error(err: csv::Error) -> StorageError {
    StorageError::Serialize(err.to_string())
}
