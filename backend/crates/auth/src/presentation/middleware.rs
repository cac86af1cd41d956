//! Auth Middleware
//!
//! Bearer-token authentication for protected routes.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, Request, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::AuthenticationGate;
use crate::application::config::AuthConfig;
use crate::domain::entity::Credential;
use crate::domain::repository::CredentialRepository;
use crate::error::AuthError;

/// Middleware state
pub struct AuthMiddlewareState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// The authenticated caller, placed in request extensions by [`require_bearer`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Credential);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that requires a valid bearer token for an active credential
pub async fn require_bearer<R>(
    state: AuthMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: CredentialRepository + Send + Sync + 'static,
{
    let Some(token) = bearer_token(req.headers()) else {
        tracing::debug!("No bearer token");
        return Err(AuthError::InvalidCredentials);
    };

    let gate = AuthenticationGate::new(state.repo.clone(), state.config.clone());
    let credential = gate.authenticate_by_token(token).await?;

    req.extensions_mut().insert(CurrentUser(credential));
    Ok(next.run(req).await)
}
