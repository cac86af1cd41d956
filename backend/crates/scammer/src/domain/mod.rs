//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (ScammerRecord, ScammerCandidate, ValidationError)
//! - Domain value objects (ScamType, ScammerStatus, GeoPoint, Location, VictimReport)
//! - Domain services (record validation)
//! - Index plan for the record collection
//! - Repository traits (interfaces)

pub mod entities;
pub mod index_plan;
pub mod repository;
pub mod services;
pub mod value_objects;
