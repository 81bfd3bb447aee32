//! CSV rendering of an extracted table.
//!
//! The header row carries resolved labels; body rows carry raw values in
//! the same column order. Quoting follows the usual CSV rules: a field is
//! quoted when it contains the delimiter, a quote or a line break, and
//! embedded quotes are doubled.

use crate::db::ExtractedTable;
use crate::error::{InsightError, Result};
use crate::labels::ColumnLabelMap;
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Returns the header labels for the table's columns.
pub fn header_labels(table: &ExtractedTable, labels: &ColumnLabelMap) -> Vec<String> {
    table
        .columns
        .iter()
        .map(|col| labels.label_or_name(col).to_string())
        .collect()
}

/// Serializes the table to CSV text. Zero-row tables yield the header only.
pub fn to_csv(table: &ExtractedTable, labels: &ColumnLabelMap) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        // Records end in a bare LF, not the RFC 4180 CRLF
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(header_labels(table, labels))
        .map_err(|e| InsightError::internal(format!("Failed to write CSV header: {e}")))?;

    for row in &table.rows {
        writer
            .write_record(row.iter().map(|value| value.to_field()))
            .map_err(|e| InsightError::internal(format!("Failed to write CSV row: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| InsightError::internal(format!("Failed to flush CSV: {e}")))?;

    String::from_utf8(bytes)
        .map_err(|e| InsightError::internal(format!("CSV output is not UTF-8: {e}")))
}
