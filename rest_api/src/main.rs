// rest_api/src/main.rs

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rest_api::{AppConfig, AppState};
use storage::SledStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let store = SledStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;

    let state = AppState::build(&config, Arc::new(store));
    rest_api::serve(&config, state).await
}
