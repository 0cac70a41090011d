use anyhow::Context;

use lsp_api::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before tracing init so RUST_LOG / LOG_FORMAT from .env apply.
    let dotenv = dotenvy::dotenv();
    lsp_observability::init();
    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "loaded .env");
    }

    let config = ApiConfig::from_env()?;
    let app = lsp_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.port))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
