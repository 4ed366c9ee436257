use clap::Parser;
use tracing_subscriber::EnvFilter;

use campus_token_api::cli::{self, Cli};
use campus_token_api::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_token_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting campus token API in {:?} mode", config.environment);

    cli::run(Cli::parse(), config).await
}
