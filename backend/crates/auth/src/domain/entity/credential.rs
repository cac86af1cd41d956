//! Credential Entity
//!
//! One per registered user. Created by registration, read during
//! authentication, never mutated here (disabling is an administrative action
//! performed directly against the store).

use kernel::id::CredentialId;
use serde::Serialize;

use crate::domain::value_object::{Email, user_name::UserName, user_password::UserPassword};

/// Stored credential
#[derive(Debug, Clone)]
pub struct Credential {
    /// Store-assigned identifier
    pub id: CredentialId,
    /// Unique login name (also the token subject)
    pub username: UserName,
    /// Unique email
    pub email: Email,
    /// Argon2id PHC string, never the plaintext
    pub password_hash: UserPassword,
    /// Disabled accounts cannot authenticate
    pub disabled: bool,
}

impl Credential {
    /// Check if the credential may authenticate
    pub fn can_login(&self) -> bool {
        !self.disabled
    }

    /// Non-secret view returned to callers
    pub fn summary(&self) -> CredentialSummary {
        CredentialSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Credential before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: UserName,
    pub email: Email,
    pub password_hash: UserPassword,
}

impl NewCredential {
    /// New credentials always start enabled
    pub fn new(username: UserName, email: Email, password_hash: UserPassword) -> Self {
        Self {
            username,
            email,
            password_hash,
        }
    }

    pub fn into_credential(self, id: CredentialId) -> Credential {
        Credential {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            disabled: false,
        }
    }
}

/// Registration result (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialSummary {
    pub id: CredentialId,
    pub username: UserName,
    pub email: Email,
}
