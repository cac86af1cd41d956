//! Scammer Registry Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Record model, validator, index plan, repository trait
//! - `application/` - Use cases
//! - `infra/` - Document store implementation
//! - `presentation/` - HTTP handlers
//!
//! ## Record Model
//! - Validation is exhaustive: every violated field is reported
//! - `lastUpdated` is stamped on every successful validation
//! - `firstReported` never changes after creation
//! - `email` is unique, enforced by the store index

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ScammerConfig;
pub use application::{PrepareReport, PrepareScammerStoreUseCase};
pub use domain::index_plan::{SCAMMERS_COLLECTION, scammer_index_plan};
pub use error::{ScammerError, ScammerResult};
pub use infra::document::DocumentScammerRepository;
pub use presentation::router::scammer_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod validation {
    pub use crate::domain::services::*;
}

#[cfg(test)]
mod tests;
