//! Bounded table extraction.
//!
//! Reads at most [`MAX_ROWS`] rows. The cap is a hard limit, not a sample:
//! rows past it are dropped without notice to the caller, and since no
//! ordering is imposed, which rows survive depends on the source.

use crate::db::{ExtractedTable, TableRef, TableSource};
use crate::error::{InsightError, Result};
use tracing::{debug, warn};

/// Maximum rows to extract from a table.
pub const MAX_ROWS: usize = 5000;

/// Extracts the table's columns and up to [`MAX_ROWS`] rows.
///
/// A row whose width differs from the column count is a fatal query error.
pub async fn extract_table(source: &dyn TableSource, table: &TableRef) -> Result<ExtractedTable> {
    let mut extracted = source.fetch_rows(table, MAX_ROWS).await?;

    if extracted.rows.len() > MAX_ROWS {
        extracted.rows.truncate(MAX_ROWS);
    }

    let width = extracted.columns.len();
    if let Some((index, row)) = extracted
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != width)
    {
        return Err(InsightError::query(format!(
            "Row {} of {} has {} values but the result has {} columns",
            index + 1,
            table,
            row.len(),
            width
        )));
    }

    if extracted.rows.len() == MAX_ROWS {
        warn!(
            "{} reached the {} row limit; any further rows are not included",
            table, MAX_ROWS
        );
    }
    debug!(
        "Extracted {} rows x {} columns from {}",
        extracted.row_count(),
        width,
        table
    );

    Ok(extracted)
}
