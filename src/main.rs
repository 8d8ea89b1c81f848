use anyhow::Result;
use ml_dashboard::{build_backend, server, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env_or_default()?;
    config.validate()?;

    info!(
        "Starting ML Dashboard API v{} on {} with the {} backend",
        ml_dashboard::VERSION,
        config.server_address(),
        config.backend
    );

    let backend = build_backend(&config)?;
    for model in backend.catalog() {
        info!("✅ {} ready: {}", model.name, model.model);
    }

    server::serve(config, backend).await
}
