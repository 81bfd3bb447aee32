//! table-insight - ask a hosted LLM about the contents of a database table.

use table_insight::auth::{ServiceAccountTokenProvider, ServiceCredential};
use table_insight::cli::Cli;
use table_insight::config::Config;
use table_insight::db;
use table_insight::error::Result;
use table_insight::llm::{VertexClient, VertexEndpoint};
use table_insight::logging::{init_stderr_logging, redact_url};
use table_insight::pipeline::Pipeline;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_stderr_logging();

    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // A missing .env file is fine
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load(&config_path)?;
    let request = cli.to_request()?;

    let credential = ServiceCredential::load(&config.vertex.credentials_path)?;
    let project_id = config
        .vertex
        .resolve_project_id(credential.project_id.as_deref())?;
    let endpoint = VertexEndpoint::from_config(&config.vertex, project_id);
    info!(
        "Model: {} in {} (project {})",
        endpoint.model, endpoint.region, endpoint.project_id
    );

    let model = VertexClient::new(endpoint)?;
    let tokens = ServiceAccountTokenProvider::new(credential)?;

    info!("Connecting to {}", redact_url(&config.database.url));
    let source = db::connect(&config.database).await?;

    let pipeline = Pipeline::new(source.as_ref(), &tokens, &model);
    let response = pipeline.run(&request).await?;

    info!("Finished ({})", response.category());
    Ok(())
}
