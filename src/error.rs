//! Error types for table-insight.
//!
//! Every variant here is fatal: it stops the run with a non-zero exit status.
//! Failures of the model call are not errors in this sense; they are carried
//! as [`crate::llm::ModelResponse`] values and written to the output file.

use thiserror::Error;

/// Main error type for table-insight operations.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Data-source connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (dictionary lookup, extraction, malformed rows)
    #[error("Query error: {0}")]
    Query(String),

    /// Service credential errors (unreadable document, signing, token exchange)
    #[error("Credential error: {0}")]
    Credential(String),

    /// Configuration errors (invalid config file, missing project, bad env values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line input (bad table path, invalid identifiers)
    #[error("Usage error: {0}")]
    Usage(String),

    /// Output file errors.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InsightError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a credential error with the given message.
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a usage error with the given message.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Credential(_) => "Credential Error",
            Self::Config(_) => "Configuration Error",
            Self::Usage(_) => "Usage Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using InsightError.
pub type Result<T> = std::result::Result<T, InsightError>;
