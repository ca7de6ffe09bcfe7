use log::info;
use pantry_recipes::server::{router, AppState};
use pantry_recipes::{AppConfig, ProviderFactory};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    let provider = ProviderFactory::get_default_provider(&config)?;
    info!(
        "Using '{}' recipe provider (available: {})",
        provider.provider_name(),
        ProviderFactory::available_providers().join(", ")
    );

    let app = router(AppState::new(Arc::from(provider)));

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on {}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
