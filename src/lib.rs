//! table-insight - ask a hosted LLM about the contents of a database table.
//!
//! The binary is a thin wrapper; the pipeline and its collaborators live
//! here so integration tests can drive them directly.

pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod labels;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod serialize;
