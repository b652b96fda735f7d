mod assessment;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod profile;
mod routes;
mod state;
mod webhooks;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::question_bank::QuestionBank;
use crate::assessment::recommendations::{
    RecommendationResolver, RemoteRecommendationResolver, StaticRecommendationTable,
};
use crate::assessment::store::{MemorySessionStore, RedisSessionStore, SessionStore};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
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

    info!("Starting EduGuide API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Load the question bank
    let bank = match &config.question_bank_path {
        Some(path) => QuestionBank::from_path(path)
            .with_context(|| format!("Failed to load question bank from {}", path.display()))?,
        None => QuestionBank::embedded().context("Embedded question bank is invalid")?,
    };
    for (tier, count) in bank.tier_counts() {
        info!("Question bank: {count} {tier} questions");
    }

    let catalog = Catalog::embedded().context("Embedded catalog is invalid")?;

    // Recommendations: the static table must be complete even when a remote
    // service is configured.
    let table = StaticRecommendationTable::embedded()
        .and_then(|t| t.validate().map(|_| t))
        .context("Static recommendation table is incomplete")?;
    let recommendations: Arc<dyn RecommendationResolver> = match &config.recommendations_url {
        Some(url) => Arc::new(
            RemoteRecommendationResolver::new(url.clone(), config.recommendations_timeout)
                .context("Failed to build recommendation client")?,
        ),
        None => Arc::new(table),
    };
    info!("Recommendation backend: {}", recommendations.backend());

    // Session store
    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisSessionStore::new(
            redis::Client::open(url.as_str())?,
            config.session_ttl,
        )),
        None => Arc::new(MemorySessionStore::new(config.session_ttl)),
    };
    info!(
        "Session backend: {} (ttl {}s)",
        sessions.backend(),
        config.session_ttl.as_secs()
    );

    let cors = build_cors(&config.cors_origins)?;

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        bank: Arc::new(bank),
        catalog: Arc::new(catalog),
        recommendations,
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'")))
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::permissive().allow_origin(AllowOrigin::list(origins)))
}
