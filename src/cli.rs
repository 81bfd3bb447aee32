//! Command-line argument parsing for table-insight.

use crate::config::Config;
use crate::db::TableRef;
use crate::error::Result;
use crate::pipeline::AnalysisRequest;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

/// Exit status for missing or malformed arguments.
pub const USAGE_EXIT_CODE: i32 = 1;

/// Ask a hosted LLM a question about the contents of a database table.
#[derive(Parser, Debug)]
#[command(name = "table-insight")]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Table to analyze, as SCHEMA/TABLE (e.g., LIB/CUST)
    #[arg(value_name = "SCHEMA/TABLE")]
    pub table: String,

    /// Question to ask about the table's data
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// File to write the answer to (overwritten if it exists)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    ///
    /// Help and version exit with status 0; any other parse failure prints
    /// the usage and exits with [`USAGE_EXIT_CODE`].
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                let _ = e.print();
                std::process::exit(USAGE_EXIT_CODE);
            }
        }
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Validates the positional arguments into an analysis request.
    pub fn to_request(&self) -> Result<AnalysisRequest> {
        Ok(AnalysisRequest {
            table: TableRef::parse(&self.table)?,
            question: self.question.clone(),
            output: self.output.clone(),
        })
    }
}
