//! Mock table source for testing.
//!
//! Holds tables and dictionary entries in memory, keyed by upper-cased
//! schema and table name, and records whether it was closed.

use super::{DictionaryEntry, ExtractedTable, Row, TableRef, TableSource};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An in-memory table source.
#[derive(Debug, Default)]
pub struct MockTableSource {
    tables: HashMap<(String, String), ExtractedTable>,
    dictionary: HashMap<(String, String), Vec<DictionaryEntry>>,
    fail_dictionary: bool,
    closed: AtomicBool,
    fetches: AtomicUsize,
}

fn key(schema: &str, table: &str) -> (String, String) {
    (schema.to_uppercase(), table.to_uppercase())
}

impl MockTableSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table with the given columns and rows.
    pub fn with_table(
        mut self,
        schema: &str,
        table: &str,
        columns: &[&str],
        rows: Vec<Row>,
    ) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.tables
            .insert(key(schema, table), ExtractedTable::new(columns, rows));
        self
    }

    /// Sets the dictionary entries for a table.
    pub fn with_dictionary(
        mut self,
        schema: &str,
        table: &str,
        entries: Vec<DictionaryEntry>,
    ) -> Self {
        self.dictionary.insert(key(schema, table), entries);
        self
    }

    /// Makes every dictionary lookup fail with a query error.
    pub fn with_failing_dictionary(mut self) -> Self {
        self.fail_dictionary = true;
        self
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of `fetch_rows` calls made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableSource for MockTableSource {
    async fn column_dictionary(&self, table: &TableRef) -> Result<Vec<DictionaryEntry>> {
        if self.fail_dictionary {
            return Err(InsightError::query(
                "Failed to read data dictionary: mock failure",
            ));
        }
        let (schema, name) = table.dictionary_key();
        Ok(self
            .dictionary
            .get(&(schema, name))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_rows(&self, table: &TableRef, limit: usize) -> Result<ExtractedTable> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let stored = self
            .tables
            .get(&key(table.schema(), table.table()))
            .ok_or_else(|| {
                InsightError::query(format!(
                    "ERROR: relation \"{}\" does not exist",
                    table.qualified_name()
                ))
            })?;

        Ok(ExtractedTable::new(
            stored.columns.clone(),
            stored.rows.iter().take(limit).cloned().collect(),
        ))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
