//! Infrastructure Layer - Persistence

pub mod document;

pub use document::DocumentScammerRepository;
