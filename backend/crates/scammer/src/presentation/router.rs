//! Scammer Router

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::application::ScammerConfig;
use crate::domain::repository::ScammerRepository;
use crate::presentation::handlers::{self, ScammerAppState};

/// Create the scammer router for any repository implementation
///
/// Authentication is layered on by the caller.
pub fn scammer_router<R>(repo: Arc<R>, config: Arc<ScammerConfig>) -> Router
where
    R: ScammerRepository + Send + Sync + 'static,
{
    let state = ScammerAppState { repo, config };

    Router::new()
        .route(
            "/scammers/",
            get(handlers::list_scammers::<R>).post(handlers::create_scammer::<R>),
        )
        .route(
            "/scammers/{id}",
            get(handlers::get_scammer::<R>).put(handlers::update_scammer::<R>),
        )
        .with_state(state)
}
