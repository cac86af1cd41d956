//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::{Credential, CredentialSummary};

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register response
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<CredentialSummary> for RegisterResponse {
    fn from(summary: CredentialSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            username: summary.username.into_inner(),
            email: summary.email.into_db(),
        }
    }
}

// ============================================================================
// Token
// ============================================================================

/// Token request (`application/x-www-form-urlencoded`)
///
/// OAuth2 password-flow fields other than these are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ============================================================================
// User Info (for authenticated users)
// ============================================================================

/// Current user info response
#[derive(Debug, Clone, Serialize)]
pub struct UserInfoResponse {
    pub username: String,
    pub email: String,
    pub disabled: bool,
}

impl From<&Credential> for UserInfoResponse {
    fn from(credential: &Credential) -> Self {
        Self {
            username: credential.username.to_string(),
            email: credential.email.to_string(),
            disabled: credential.disabled,
        }
    }
}
