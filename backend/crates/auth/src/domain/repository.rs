//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::CredentialId;

use crate::domain::entity::{Credential, NewCredential};
use crate::domain::value_object::{Email, user_name::UserName};
use crate::error::AuthResult;

/// Credential repository trait
#[trait_variant::make(CredentialRepository: Send)]
pub trait LocalCredentialRepository {
    /// Store a new credential
    ///
    /// A uniqueness violation at the store is reported as `AuthError::AlreadyExists`.
    async fn create(&self, credential: &NewCredential) -> AuthResult<CredentialId>;

    /// Find credential by exact user name
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>>;

    /// Whether a credential with this user name OR this email exists (single lookup)
    async fn exists_by_username_or_email(
        &self,
        username: &UserName,
        email: &Email,
    ) -> AuthResult<bool>;
}
