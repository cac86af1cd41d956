//! Prepare Scammer Store Use Case
//!
//! Runs once at startup, before any request is served. Records without an
//! email would block the unique email index, so they are pruned first.
//! Any failure here must abort startup.

use std::sync::Arc;

use crate::domain::repository::ScammerRepository;
use crate::error::ScammerResult;

/// What startup preparation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareReport {
    pub pruned: u64,
    pub indexes: Vec<String>,
}

/// Prepare Scammer Store Use Case
pub struct PrepareScammerStoreUseCase<R>
where
    R: ScammerRepository,
{
    repo: Arc<R>,
}

impl<R> PrepareScammerStoreUseCase<R>
where
    R: ScammerRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> ScammerResult<PrepareReport> {
        let pruned = self.repo.prune_missing_email().await?;
        if pruned > 0 {
            tracing::warn!(pruned, "Removed scammer records without email");
        } else {
            tracing::info!("No scammer records without email");
        }

        let indexes = self.repo.apply_index_plan().await?;
        tracing::info!(count = indexes.len(), "Scammer index plan applied");

        Ok(PrepareReport { pruned, indexes })
    }
}
