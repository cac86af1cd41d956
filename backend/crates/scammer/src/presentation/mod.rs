//! Presentation Layer - HTTP handlers, DTOs, router

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ScammerAppState;
pub use router::scammer_router;
