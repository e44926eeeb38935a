mod auth;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::store::{AccountStore, PgAccountStore};
use crate::config::Config;
use crate::db::create_pool;
use crate::matching::ai_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Matchpoint API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the account store
    let pool = create_pool(&config.database_url).await?;
    let store: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool));

    // Initialize the Gemini client. A missing API key is reported per-call,
    // so the auth endpoints stay usable on a partially configured deploy.
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; scoring endpoints will return MISCONFIGURED");
    }
    let ai = GeminiClient::new(config.gemini_api_key.clone());
    info!("Gemini client initialized");

    // Build app state and router
    let state = AppState {
        ai,
        store,
        config: config.clone(),
    };
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
