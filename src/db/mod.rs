//! Table source abstraction for table-insight.
//!
//! The pipeline only needs two things from a data source: the data
//! dictionary for a table and a bounded read of its rows. This trait keeps
//! the backend swappable and lets tests run against an in-memory source.

mod mock;
mod postgres;
mod types;

pub use mock::MockTableSource;
pub use postgres::PostgresSource;
pub use types::{DictionaryEntry, ExtractedTable, Row, TableRef, Value};

use crate::config::DatabaseConfig;
use crate::error::{InsightError, Result};
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseBackend {
    #[default]
    Postgres,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
        }
    }

    /// Determines the backend from a connection URL's scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme);
        match scheme.map(str::to_lowercase).as_deref() {
            Some("postgres") | Some("postgresql") => Ok(Self::Postgres),
            Some(other) => Err(InsightError::config(format!(
                "Unsupported database scheme '{other}'. Expected 'postgres' or 'postgresql'"
            ))),
            None => Err(InsightError::config(
                "Database URL must look like postgres://user@host:port/database",
            )),
        }
    }
}

/// Opens a table source for the configured database.
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn TableSource>> {
    match DatabaseBackend::from_url(&config.url)? {
        DatabaseBackend::Postgres => {
            let source = PostgresSource::connect(config).await?;
            Ok(Box::new(source))
        }
    }
}

/// Interface the pipeline uses to read a table.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Returns dictionary entries for the table, in physical column order.
    ///
    /// Lookups use the upper-cased identifiers from [`TableRef::dictionary_key`].
    /// An unknown table yields an empty list, not an error.
    async fn column_dictionary(&self, table: &TableRef) -> Result<Vec<DictionaryEntry>>;

    /// Reads at most `limit` rows of every column, in source order.
    async fn fetch_rows(&self, table: &TableRef, limit: usize) -> Result<ExtractedTable>;

    /// Releases the underlying connection.
    async fn close(&self) -> Result<()>;
}
