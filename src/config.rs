//! Configuration management for table-insight.
//!
//! Configuration is read once at startup from an optional TOML file and
//! the process environment, then passed explicitly to every component.
//! Precedence: environment > config file > built-in defaults.

use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PROJECT_ID: &str = "GCP_PROJECT_ID";
pub const ENV_REGION: &str = "GCP_REGION";
pub const ENV_MODEL: &str = "MODEL";
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_TIMEOUT: &str = "MODEL_TIMEOUT_SECS";
pub const ENV_API_BASE: &str = "VERTEX_API_BASE";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Main configuration structure for table-insight.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Model endpoint configuration.
    #[serde(default)]
    pub vertex: VertexConfig,

    /// Data source configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Model endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VertexConfig {
    /// Cloud project hosting the model. Falls back to the credential's project.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Provider region (e.g., "asia-northeast1").
    #[serde(default = "default_region")]
    pub region: String,

    /// Model identifier (e.g., "gemini-2.0-flash").
    #[serde(default = "default_model")]
    pub model: String,

    /// Path to the service credential document.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Timeout for the model call in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Overrides the regional API base URL.
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_region() -> String {
    "asia-northeast1".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("vertex-ai-credentials.json")
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            region: default_region(),
            model: default_model(),
            credentials_path: default_credentials_path(),
            timeout_secs: default_timeout_secs(),
            api_base: None,
        }
    }
}

impl VertexConfig {
    /// Returns the API base URL: the override if set, else the regional host.
    pub fn api_base_url(&self) -> String {
        match &self.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.region),
        }
    }

    /// Picks the project id: configured value first, then the credential's.
    pub fn resolve_project_id(&self, credential_project: Option<&str>) -> Result<String> {
        self.project_id
            .as_deref()
            .or(credential_project)
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                InsightError::config(format!(
                    "{ENV_PROJECT_ID} is not set and the credential document has no project_id"
                ))
            })
    }
}

/// Data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Connection URL for the data source.
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "postgres://localhost:5432/postgres".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("table-insight")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| InsightError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            InsightError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Loads the file at `path`, then applies the process environment on top.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies environment overrides using the given lookup.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project) = get(ENV_PROJECT_ID) {
            self.vertex.project_id = Some(project);
        }
        if let Some(region) = get(ENV_REGION) {
            self.vertex.region = region;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.vertex.model = model;
        }
        if let Some(path) = get(ENV_CREDENTIALS) {
            self.vertex.credentials_path = PathBuf::from(path);
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            self.vertex.timeout_secs = raw.trim().parse().map_err(|_| {
                InsightError::config(format!(
                    "{ENV_TIMEOUT} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
        }
        if let Some(base) = get(ENV_API_BASE) {
            self.vertex.api_base = Some(base);
        }
        if let Some(url) = get(ENV_DATABASE_URL) {
            self.database.url = url;
        }

        Ok(())
    }
}
