//! Sign Up Use Case
//!
//! Registers a new credential.

use std::sync::Arc;

use kernel::email::Email;
use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::domain::entity::{CredentialSummary, NewCredential};
use crate::domain::repository::CredentialRepository;
use crate::domain::value_object::{
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<R>
where
    R: CredentialRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> SignUpUseCase<R>
where
    R: CredentialRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<CredentialSummary> {
        // Validate input
        let username =
            UserName::new(&input.username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(input.email)
            .map_err(|e| AuthError::Validation(format!("Invalid email: {}", e)))?;
        let raw_password = RawPassword::new(input.password)?;

        // Friendly pre-check; the unique indexes remain the source of truth
        if self
            .repo
            .exists_by_username_or_email(&username, &email)
            .await?
        {
            tracing::info!(username = %username, "Registration rejected: already exists");
            return Err(AuthError::AlreadyExists);
        }

        // Hash on the blocking pool
        let hasher = PasswordHasher::new(self.config.password_pepper.clone());
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(raw_password.inner()))
            .await?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let new_credential = NewCredential::new(username, email, UserPassword::from(hashed));
        let id = self.repo.create(&new_credential).await?;
        let credential = new_credential.into_credential(id);

        tracing::info!(
            credential_id = %credential.id,
            username = %credential.username,
            "User registered"
        );

        Ok(credential.summary())
    }
}
