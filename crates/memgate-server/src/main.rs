use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{Method, header};
use tower_http::cors::CorsLayer;

use memgate_ai::OpenAIClient;
use memgate_client::MemoryClient;
use memgate_server::api::{self, AppState};
use memgate_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,memgate_server=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting memgate dispatch server");

    let config = ServerConfig::load()?;

    let memory = Arc::new(
        MemoryClient::new(config.memory_api_key.clone()).with_base_url(config.memory_base_url.clone()),
    );

    let mut llm = OpenAIClient::new(config.openai_api_key.clone()).with_model(config.model.clone());
    if let Some(base_url) = &config.openai_base_url {
        llm = llm.with_base_url(base_url.clone());
    }

    let state = AppState::new(memory, Arc::new(llm));

    // Browser callers hit these routes cross-origin; answer preflight for
    // every route.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = api::router(state).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(model = %config.model, "memgate running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("memgate shutting down");
        })
        .await
        .context("Failed to start server")?;

    Ok(())
}
