//! Authentication Gate
//!
//! Resolves a username/password pair or a bearer token into an active
//! credential. Every rejection is the same `AuthError::InvalidCredentials`;
//! the specific reason only goes to the log.
//!
//! Usernames go through the same normalization as at registration. An
//! unknown username still pays for one password verification.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::domain::entity::Credential;
use crate::domain::repository::CredentialRepository;
use crate::domain::value_object::user_name::UserName;
use crate::domain::value_object::user_password::RawPassword;
use crate::error::{AuthError, AuthResult};

/// Authentication gate
pub struct AuthenticationGate<R>
where
    R: CredentialRepository,
{
    repo: Arc<R>,
    tokens: TokenService,
    hasher: PasswordHasher,
}

impl<R> AuthenticationGate<R>
where
    R: CredentialRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        let hasher = PasswordHasher::new(config.password_pepper.clone());
        Self {
            repo,
            tokens: TokenService::new(config),
            hasher,
        }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.tokens
    }

    /// Authenticate a username/password pair
    pub async fn authenticate_by_password(
        &self,
        username: &str,
        password: String,
    ) -> AuthResult<Credential> {
        let Ok(password) = RawPassword::new(password) else {
            return Err(reject(username, "invalid_password_input"));
        };

        let Ok(name) = UserName::new(username) else {
            return Err(reject(username, "invalid_username_input"));
        };

        let Some(credential) = self.repo.find_by_username(name.as_str()).await? else {
            let hasher = self.hasher.clone();
            tokio::task::spawn_blocking(move || hasher.verify_dummy(password.inner())).await?;
            return Err(reject(username, "unknown_user"));
        };

        let hasher = self.hasher.clone();
        let stored = credential.password_hash.clone();
        let outcome =
            tokio::task::spawn_blocking(move || hasher.check(password.inner(), stored.hashed()))
                .await?;

        match outcome {
            Ok(true) => {
                tracing::info!(username = %credential.username, "Password authentication succeeded");
                Ok(credential)
            }
            Ok(false) => Err(reject(username, "wrong_password")),
            Err(e) => {
                tracing::error!(
                    username = %username,
                    error = %e,
                    "Stored password hash is corrupt"
                );
                Err(reject(username, "malformed_hash"))
            }
        }
    }

    /// Resolve a bearer token into an active credential
    pub async fn authenticate_by_token(&self, token: &str) -> AuthResult<Credential> {
        let subject = match self.tokens.verify(token) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::warn!(reason = e.reason(), "Bearer token rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let Some(credential) = self.repo.find_by_username(&subject).await? else {
            return Err(reject(&subject, "unknown_subject"));
        };

        if !credential.can_login() {
            return Err(reject(&subject, "disabled"));
        }

        Ok(credential)
    }
}

fn reject(username: &str, reason: &'static str) -> AuthError {
    tracing::warn!(username = %username, reason, "Authentication failed");
    AuthError::InvalidCredentials
}
