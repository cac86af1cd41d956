//! Repository Traits
//!
//! Interfaces for record persistence. Implementation is in infra layer.

use kernel::id::ScammerId;

use crate::domain::entities::ScammerRecord;
use crate::domain::value_objects::ScammerQuery;
use crate::error::ScammerResult;

/// Scammer record repository trait
#[trait_variant::make(ScammerRepository: Send)]
pub trait LocalScammerRepository {
    /// Insert a validated record. A duplicate email is `DuplicateEmail`.
    async fn insert(&self, record: &ScammerRecord) -> ScammerResult<ScammerId>;

    /// Get a record by id (with `id` populated)
    async fn get(&self, id: ScammerId) -> ScammerResult<Option<ScammerRecord>>;

    /// Replace a record. Returns false when the id is unknown.
    async fn replace(&self, id: ScammerId, record: &ScammerRecord) -> ScammerResult<bool>;

    /// Records matching the query, sorted and limited
    async fn list(&self, query: &ScammerQuery) -> ScammerResult<Vec<ScammerRecord>>;

    /// Delete records whose email is missing or null, returning the count
    async fn prune_missing_email(&self) -> ScammerResult<u64>;

    /// Apply the index plan, returning the index names
    async fn apply_index_plan(&self) -> ScammerResult<Vec<String>>;
}
