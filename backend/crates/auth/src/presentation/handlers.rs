//! HTTP Handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};

use crate::application::config::AuthConfig;
use crate::application::{SignInInput, SignInUseCase, SignUpInput, SignUpUseCase};
use crate::domain::repository::CredentialRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    RegisterRequest, RegisterResponse, TokenRequest, TokenResponse, UserInfoResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
pub struct AuthAppState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<RegisterResponse>)>
where
    R: CredentialRepository + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let input = SignUpInput {
        username: req.username,
        email: req.email,
        password: req.password,
    };

    let summary = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(summary.into())))
}

// ============================================================================
// Token
// ============================================================================

/// POST /token
pub async fn issue_token<R>(
    State(state): State<AuthAppState<R>>,
    Form(req): Form<TokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: CredentialRepository + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignInInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(TokenResponse {
        access_token: output.access_token,
        token_type: output.token_type.to_string(),
    }))
}

// ============================================================================
// Current user
// ============================================================================

/// GET /users/me/
pub async fn me(CurrentUser(credential): CurrentUser) -> Json<UserInfoResponse> {
    Json(UserInfoResponse::from(&credential))
}
