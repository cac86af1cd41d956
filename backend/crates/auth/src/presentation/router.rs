//! Auth Router

use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::{
    Router,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::CredentialRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_bearer};

/// Create the Auth router for any credential repository
///
/// Routes: `POST /register`, `POST /token`, `GET /users/me/`.
pub fn auth_router<R>(repo: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: CredentialRepository + Send + Sync + 'static,
{
    let middleware_state = AuthMiddlewareState {
        repo: repo.clone(),
        config: config.clone(),
    };
    let state = AuthAppState { repo, config };

    let protected = Router::new()
        .route("/users/me/", get(handlers::me))
        .route_layer(middleware::from_fn(move |req: Request, next: Next| {
            require_bearer(middleware_state.clone(), req, next)
        }));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/token", post(handlers::issue_token::<R>))
        .merge(protected)
        .with_state(state)
}
