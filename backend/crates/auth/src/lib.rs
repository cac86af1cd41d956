//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Credential entity, value objects, repository trait
//! - `application/` - Use cases, token service, authentication gate
//! - `infra/` - Document store implementation
//! - `presentation/` - HTTP handlers, DTOs, router, bearer middleware
//!
//! ## Features
//! - Registration with username + email + password
//! - OAuth2 password-flow token endpoint (`POST /token`)
//! - Signed, time-bounded bearer tokens
//! - Bearer middleware for protecting other routers
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional server-side pepper
//! - Every authentication failure looks identical to the caller
//! - Uniqueness of username and email enforced by store indexes

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token::TokenAlgorithm;
pub use error::{AuthError, AuthResult};
pub use infra::document::{DocumentCredentialRepository, USERS_COLLECTION, users_index_plan};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
