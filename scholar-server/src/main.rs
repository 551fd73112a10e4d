//! Scholar server — HTTP service for AI research generation.
//!
//! Exposes `POST /api/generate` and optionally serves a static frontend
//! directory as the fallback, so a single process can host both the API
//! and the single-page app that consumes it.

mod routes;

use anyhow::Context;
use routes::AppState;
use scholar_core::{GeminiProvider, ResearchProvider, load_config};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading any configuration from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let config = load_config(Some(&cwd), None).context("failed to load configuration")?;

    // A missing key is reported per request rather than refusing to start,
    // so the frontend still gets a clear error message.
    let provider: Option<Arc<dyn ResearchProvider>> =
        match GeminiProvider::new(&config.provider) {
            Ok(p) => {
                info!(model = p.model_name(), "provider configured");
                Some(Arc::new(p))
            }
            Err(e) => {
                warn!("starting without a provider: {e}");
                None
            }
        };

    let state = Arc::new(AppState { provider });
    let mut app = routes::api_router(state);

    if let Some(dir) = &config.server.frontend_dir {
        let index = std::path::Path::new(dir).join("index.html");
        let static_service = ServeDir::new(dir).not_found_service(ServeFile::new(&index));
        app = app.fallback_service(static_service);
        info!(frontend = %dir, "serving static frontend");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
