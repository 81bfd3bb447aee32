//! Data types shared by table sources.
//!
//! Covers table references, data-dictionary entries, extracted rows, and
//! the value type used for individual cells.

use crate::error::{InsightError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Identifier characters accepted for schema and table names.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_#@$][A-Za-z0-9_#@$]*$";

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"))
}

/// A validated `SCHEMA/TABLE` reference.
///
/// Both parts are plain SQL identifiers, so they can be interpolated into
/// the extraction query without quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    schema: String,
    table: String,
}

impl TableRef {
    /// Creates a reference after validating both identifiers.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let table = table.into();
        for (kind, ident) in [("schema", &schema), ("table", &table)] {
            if !identifier_regex().is_match(ident) {
                return Err(InsightError::usage(format!(
                    "Invalid {kind} name '{ident}': expected letters, digits, _, #, @ or $"
                )));
            }
        }
        Ok(Self { schema, table })
    }

    /// Parses `SCHEMA/TABLE`.
    pub fn parse(path: &str) -> Result<Self> {
        match path.split('/').collect::<Vec<_>>().as_slice() {
            [schema, table] => Self::new(*schema, *table),
            _ => Err(InsightError::usage(format!(
                "Invalid table '{path}': expected SCHEMA/TABLE (e.g., LIB/CUST)"
            ))),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns `schema.table` for use in a FROM clause.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Returns the upper-cased (schema, table) pair used for dictionary lookups.
    pub fn dictionary_key(&self) -> (String, String) {
        (self.schema.to_uppercase(), self.table.to_uppercase())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.schema, self.table)
    }
}

/// One data-dictionary row for a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionaryEntry {
    /// Physical column name, as stored by the dictionary.
    pub column_name: String,
    /// Short column heading, if any.
    pub heading: Option<String>,
    /// Descriptive column text, if any.
    pub text: Option<String>,
}

impl DictionaryEntry {
    pub fn new(
        column_name: impl Into<String>,
        heading: Option<&str>,
        text: Option<&str>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            heading: heading.map(String::from),
            text: text.map(String::from),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Column names and rows read from a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTable {
    /// Column names, as reported by the query metadata.
    pub columns: Vec<String>,
    /// Rows in source order.
    pub rows: Vec<Row>,
}

impl ExtractedTable {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single cell value.
///
/// Only NULL, booleans and integers are decoded; every other type keeps the
/// server's text rendering so the CSV carries the value as stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Signed integer (up to i64).
    Int(i64),
    /// Text value, including types rendered by the server as text.
    Text(String),
}

impl Value {
    /// Renders the value as a CSV field. NULL is the empty string.
    pub fn to_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_field())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
