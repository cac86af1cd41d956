//! Value Object Module

pub mod user_name;
pub mod user_password;

/// Emails are validated by the shared kernel
pub use kernel::email::{Email, EmailError};
