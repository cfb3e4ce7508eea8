mod calendar;
mod config;
mod errors;
mod llm_client;
mod routes;
mod scheduling;
mod screening;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::calendar::google::GoogleCalendarClient;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::screening::assess::GeminiResumeScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the AI scorer from explicit configuration
    let gemini = GeminiClient::new(config.gemini())?;
    info!("LLM client initialized (model: {})", gemini.model());
    let scorer = Arc::new(GeminiResumeScorer(gemini));

    // Initialize the calendar backend; authorization happens lazily per request
    let calendar = Arc::new(GoogleCalendarClient::new(
        reqwest::Client::new(),
        config.calendar_base_url.clone(),
        config.calendar_id.clone(),
        config.credentials_file.clone(),
        config.token_file.clone(),
    ));
    info!(
        calendar_id = %config.calendar_id,
        token_file = %config.token_file.display(),
        "Calendar client initialized"
    );

    let state = AppState {
        config: config.clone(),
        scorer,
        calendar,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
