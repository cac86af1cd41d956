//! Infrastructure Layer
//!
//! Document store implementations.

pub mod document;

pub use document::{DocumentCredentialRepository, USERS_COLLECTION, users_index_plan};
