//! Column label resolution.
//!
//! Turns data-dictionary entries into human-readable labels. Precedence is
//! fixed: descriptive text, then heading, then the raw column name. Values
//! are trimmed before they are tested for emptiness.

use crate::db::{DictionaryEntry, TableRef, TableSource};
use crate::error::Result;
use std::collections::HashMap;
use tracing::debug;

/// Physical column name to display label, in physical column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLabelMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ColumnLabelMap {
    /// Builds the map from dictionary entries, keeping their order.
    ///
    /// A column listed twice keeps its first position and label.
    pub fn from_dictionary(entries: &[DictionaryEntry]) -> Self {
        let mut map = Self::default();
        for entry in entries {
            if map.index.contains_key(&entry.column_name) {
                continue;
            }
            map.index
                .insert(entry.column_name.clone(), map.entries.len());
            map.entries
                .push((entry.column_name.clone(), resolve_label(entry)));
        }
        map
    }

    /// Returns the label for a column, if the dictionary knew it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Returns the label for a column, falling back to the column name.
    pub fn label_or_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.get(column).unwrap_or(column)
    }

    /// Iterates (column, label) pairs in physical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Picks the label for one column.
pub fn resolve_label(entry: &DictionaryEntry) -> String {
    non_empty(entry.text.as_deref())
        .or_else(|| non_empty(entry.heading.as_deref()))
        .unwrap_or(&entry.column_name)
        .to_string()
}

/// Reads the dictionary for `table` and resolves every column's label.
pub async fn resolve_labels(source: &dyn TableSource, table: &TableRef) -> Result<ColumnLabelMap> {
    let entries = source.column_dictionary(table).await?;
    let labels = ColumnLabelMap::from_dictionary(&entries);
    debug!("Resolved {} column labels for {}", labels.len(), table);
    Ok(labels)
}
