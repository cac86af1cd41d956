//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id with optional pepper)
//! - Document store abstraction (in-memory and PostgreSQL/JSONB backends)

pub mod document;
pub mod password;
