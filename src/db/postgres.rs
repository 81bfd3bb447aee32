//! PostgreSQL table source.
//!
//! Provides `PostgresSource`, which implements `TableSource` using sqlx over
//! a single-connection pool.
//!
//! The data dictionary comes from `pg_attribute`. Column comments
//! (`COMMENT ON COLUMN`) act as the descriptive text. PostgreSQL has no
//! column-heading attribute, so headings are always NULL here.

use crate::config::DatabaseConfig;
use crate::db::{DictionaryEntry, ExtractedTable, Row, TableRef, TableSource, Value};
use crate::error::{InsightError, Result};
use crate::logging::redact_url;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Statement, TypeInfo};
use std::time::Duration;
use tracing::debug;

/// How long to wait for the connection to be established.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Dictionary lookup. Identifiers arrive upper-cased; catalog names are
/// compared upper-cased too so unquoted (lower-case) names still match.
const DICTIONARY_SQL: &str = r#"
    SELECT
        a.attname::text AS column_name,
        NULL::text AS column_heading,
        col_description(a.attrelid, a.attnum) AS column_text
    FROM pg_attribute a
    JOIN pg_class t ON t.oid = a.attrelid
    JOIN pg_namespace n ON n.oid = t.relnamespace
    WHERE upper(n.nspname) = $1
        AND upper(t.relname) = $2
        AND a.attnum > 0
        AND NOT a.attisdropped
    ORDER BY a.attnum
"#;

/// PostgreSQL table source.
#[derive(Debug)]
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    /// Connects to the configured database.
    ///
    /// Failures are not retried.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        debug!("Connecting to {}", redact_url(&config.url));

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect(&config.url)
            .await
            .map_err(|e| map_connection_error(e, &config.url))?;

        Ok(Self { pool })
    }

    /// Column names for a query, taken from the prepared statement so they
    /// are known even when no rows come back.
    async fn describe_columns(&self, sql: &str) -> Result<Vec<String>> {
        let statement = (&self.pool)
            .prepare(sql)
            .await
            .map_err(|e| InsightError::query(format_query_error(e)))?;

        Ok(statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect())
    }
}

#[async_trait]
impl TableSource for PostgresSource {
    async fn column_dictionary(&self, table: &TableRef) -> Result<Vec<DictionaryEntry>> {
        let (schema, name) = table.dictionary_key();

        let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(DICTIONARY_SQL)
            .bind(&schema)
            .bind(&name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                InsightError::query(format!(
                    "Failed to read data dictionary for {schema}/{name}: {}",
                    format_query_error(e)
                ))
            })?;

        Ok(rows
            .into_iter()
            .map(|(column_name, heading, text)| DictionaryEntry {
                column_name,
                heading,
                text,
            })
            .collect())
    }

    async fn fetch_rows(&self, table: &TableRef, limit: usize) -> Result<ExtractedTable> {
        let sql = format!(
            "SELECT * FROM {} FETCH FIRST {limit} ROWS ONLY",
            table.qualified_name()
        );
        debug!("Extracting with: {sql}");

        let columns = self.describe_columns(&sql).await?;

        // The simple query protocol returns every value in text form, which
        // lets types without a native decoder (numeric, dates) pass through.
        let result: Vec<PgRow> = sqlx::raw_sql(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| InsightError::query(format_query_error(e)))?;

        let rows = result.iter().map(convert_row).collect();

        Ok(ExtractedTable::new(columns, rows))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a text-format PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let text = row.try_get_unchecked::<Option<String>, _>(i).ok().flatten();
            convert_value(text, col.type_info().name())
        })
        .collect()
}

/// Converts a column's text rendering to a Value based on its type name.
fn convert_value(text: Option<String>, type_name: &str) -> Value {
    let Some(text) = text else {
        return Value::Null;
    };

    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => match text.as_str() {
            "t" | "true" => Value::Bool(true),
            "f" | "false" => Value::Bool(false),
            _ => Value::Text(text),
        },

        "INT2" | "SMALLINT" | "INT4" | "INT" | "INTEGER" | "INT8" | "BIGINT" => text
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Text(text)),

        // Floats, NUMERIC, dates, bytea and everything else keep the
        // server's rendering (e.g. "Infinity", "1e+20", "\x0a0b")
        _ => Value::Text(text),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, url: &str) -> InsightError {
    let target = redact_url(url);
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        InsightError::connection(format!(
            "Cannot connect to {target}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        InsightError::connection(format!(
            "Authentication failed for {target}. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        InsightError::connection(format!("Database in {target} does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        InsightError::connection(format!(
            "Connection to {target} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        InsightError::connection(format!("{target}: {error}"))
    }
}

/// Formats a query error with detail and hint when available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = format!("ERROR: {}", db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
