use std::sync::Arc;

use qrec_api::{
    api::{create_router, AppState},
    config::Config,
    services::{
        preprocess::{preprocess, PreprocessPaths},
        HttpEncoder, HttpFactorizer, Recommender,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let encoder = HttpEncoder::new(config.encoder_url.clone());

    match std::env::args().nth(1).as_deref() {
        Some("preprocess") => run_preprocess(&config, encoder).await,
        None | Some("serve") => serve(&config, encoder).await,
        Some(other) => anyhow::bail!("unknown command `{}` (expected `serve` or `preprocess`)", other),
    }
}

async fn run_preprocess(config: &Config, encoder: HttpEncoder) -> anyhow::Result<()> {
    let factorizer = HttpFactorizer::new(config.factorizer_url.clone(), config.factors);
    let paths = PreprocessPaths {
        items: config.items_path.clone(),
        interactions: config.interactions_path.clone(),
        serialised_dir: config.serialised_dir.clone(),
    };

    let summary = preprocess(&paths, &encoder, &factorizer).await?;
    tracing::info!(?summary, "Preprocessing finished");
    Ok(())
}

async fn serve(config: &Config, encoder: HttpEncoder) -> anyhow::Result<()> {
    // Load and validate everything before accepting traffic
    let recommender = Recommender::load(
        &config.items_path,
        &config.interactions_path,
        &config.serialised_dir,
        Arc::new(encoder),
    )?;

    let app = create_router(AppState::new(recommender));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");
    axum::serve(listener, app).await?;
    Ok(())
}
