//! The extraction-to-inference pipeline.
//!
//! Stages run strictly one after another: resolve labels, extract the
//! table, serialize it, exchange the credential for a token, build the
//! prompt, call the model, write the result.
//!
//! Failures before the model call are fatal and come back as `Err`. Model
//! failures are ordinary results: their description is written to the
//! output file just like an answer.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::auth::TokenProvider;
use crate::db::{TableRef, TableSource};
use crate::error::{InsightError, Result};
use crate::extract::extract_table;
use crate::labels::resolve_labels;
use crate::llm::{build_prompt, ModelClient, ModelResponse};
use crate::serialize::to_csv;

/// One analysis job: which table, what to ask, where to write the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub table: TableRef,
    pub question: String,
    pub output: PathBuf,
}

/// Wires the collaborators together for a single run.
pub struct Pipeline<'a> {
    source: &'a dyn TableSource,
    tokens: &'a dyn TokenProvider,
    model: &'a dyn ModelClient,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        source: &'a dyn TableSource,
        tokens: &'a dyn TokenProvider,
        model: &'a dyn ModelClient,
    ) -> Self {
        Self {
            source,
            tokens,
            model,
        }
    }

    /// Reads the table and renders it as CSV.
    ///
    /// The source is closed afterwards whether or not reading succeeded.
    pub async fn prepare_data(&self, table: &TableRef) -> Result<String> {
        let result = self.read_table(table).await;

        if let Err(e) = self.source.close().await {
            warn!("Failed to close data source: {e}");
        }

        result
    }

    async fn read_table(&self, table: &TableRef) -> Result<String> {
        let labels = resolve_labels(self.source, table).await?;
        let extracted = extract_table(self.source, table).await?;
        info!(
            "Read {} rows x {} columns from {}",
            extracted.row_count(),
            extracted.columns.len(),
            table
        );
        to_csv(&extracted, &labels)
    }

    /// Runs every stage up to and including the model call.
    pub async fn analyze(&self, table: &TableRef, question: &str) -> Result<ModelResponse> {
        let csv_data = self.prepare_data(table).await?;

        let token = self.tokens.access_token().await?;
        let prompt = build_prompt(question, &csv_data);

        info!("Sending {} byte prompt to the model", prompt.len());
        let response = self.model.generate(&token, &prompt).await;

        if !response.is_success() {
            warn!("Model call failed ({}): {}", response.category(), response);
        }

        Ok(response)
    }

    /// Runs the whole pipeline and writes the result to `request.output`.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<ModelResponse> {
        let response = self.analyze(&request.table, &request.question).await?;
        write_output(&request.output, &response.to_string())?;
        info!("Wrote result to {}", request.output.display());
        Ok(response)
    }
}

/// Writes `text` to `path` as UTF-8, replacing any existing file.
pub fn write_output(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| {
        InsightError::io(format!("Failed to write {}: {e}", path.display()))
    })
}
