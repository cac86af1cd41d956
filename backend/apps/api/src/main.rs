//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors render through
//! `kernel::error::AppError` inside the domain crates.

mod config;
mod health;

use std::sync::Arc;

use anyhow::Context;
use auth::middleware::{AuthMiddlewareState, require_bearer};
use auth::{DocumentCredentialRepository, auth_router};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::document::{DocumentStoreBackend, MemoryDocumentStore, PgDocumentStore};
use scammer::{DocumentScammerRepository, PrepareScammerStoreUseCase, ScammerConfig, scammer_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(app = %settings.app_name, debug = settings.debug_mode, "Starting");

    let store = Arc::new(connect_store(&settings).await?);

    // Index plans must be in place before any request is served
    let credentials = Arc::new(DocumentCredentialRepository::new(store.clone()));
    credentials
        .ensure_indexes()
        .await
        .context("Failed to apply users index plan")?;

    let scammers = Arc::new(DocumentScammerRepository::new(store.clone()));
    let report = PrepareScammerStoreUseCase::new(scammers.clone())
        .execute()
        .await
        .context("Failed to prepare scammer store")?;
    tracing::info!(
        pruned = report.pruned,
        indexes = report.indexes.len(),
        "Scammer store ready"
    );

    let auth_config = Arc::new(settings.auth_config());

    // Record routes require a bearer token
    let bearer = AuthMiddlewareState {
        repo: credentials.clone(),
        config: auth_config.clone(),
    };
    let records = scammer_router(scammers, Arc::new(ScammerConfig::default())).route_layer(
        middleware::from_fn(move |req: Request, next: Next| {
            require_bearer(bearer.clone(), req, next)
        }),
    );

    // Build router
    let app = Router::new()
        .merge(auth_router(credentials, auth_config))
        .merge(records)
        .merge(health::health_router(store))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings));

    // Start server
    tracing::info!("Listening on {}", settings.bind_addr);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise the in-memory store
async fn connect_store(settings: &Settings) -> anyhow::Result<DocumentStoreBackend> {
    let Some(database_url) = &settings.database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
        return Ok(DocumentStoreBackend::Memory(MemoryDocumentStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    Ok(DocumentStoreBackend::Postgres(PgDocumentStore::new(pool)))
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    if settings.allows_any_origin() {
        return cors.allow_origin(AllowOrigin::any());
    }

    let allowed_origins: Vec<http::HeaderValue> = settings
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    cors.allow_origin(allowed_origins).allow_credentials(true)
}
