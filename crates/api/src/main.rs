use anyhow::Context;

use lexicon_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lexicon_observability::init();

    let config = ApiConfig::from_env()?;
    let app = lexicon_api::app::build_app(&config).context("failed to build application")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, issuer = %config.issuer, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
