//! Sign In Use Case
//!
//! Exchanges a username/password pair for a bearer access token.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::gate::AuthenticationGate;
use crate::domain::repository::CredentialRepository;
use crate::error::AuthResult;

/// Sign in input
pub struct SignInInput {
    pub username: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug, Clone)]
pub struct SignInOutput {
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: &'static str,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: CredentialRepository,
{
    gate: AuthenticationGate<R>,
    config: Arc<AuthConfig>,
}

impl<R> SignInUseCase<R>
where
    R: CredentialRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            gate: AuthenticationGate::new(repo, config.clone()),
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let credential = self
            .gate
            .authenticate_by_password(&input.username, input.password)
            .await?;

        let access_token = self
            .gate
            .token_service()
            .issue(credential.username.as_str(), self.config.access_token_ttl)?;

        tracing::info!(
            username = %credential.username,
            ttl_secs = self.config.access_token_ttl.as_secs(),
            "Access token issued"
        );

        Ok(SignInOutput {
            access_token,
            token_type: "bearer",
        })
    }
}
