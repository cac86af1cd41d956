//! Application Layer - Use cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod config;
pub mod create_scammer;
pub mod get_scammer;
pub mod list_scammers;
pub mod prepare_store;
pub mod update_scammer;

pub use config::ScammerConfig;
pub use create_scammer::CreateScammerUseCase;
pub use get_scammer::GetScammerUseCase;
pub use list_scammers::{ListScammersInput, ListScammersUseCase};
pub use prepare_store::{PrepareReport, PrepareScammerStoreUseCase};
pub use update_scammer::UpdateScammerUseCase;
