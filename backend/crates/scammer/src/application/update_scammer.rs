//! Update Scammer Use Case
//!
//! Full replacement: the new body goes through the same validator as a
//! create, keeping the stored `firstReported`.

use std::sync::Arc;

use chrono::Utc;

use crate::application::get_scammer::parse_id;
use crate::domain::entities::{ScammerCandidate, ScammerRecord};
use crate::domain::repository::ScammerRepository;
use crate::domain::services;
use crate::error::{ScammerError, ScammerResult};

/// Update Scammer Use Case
pub struct UpdateScammerUseCase<R>
where
    R: ScammerRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateScammerUseCase<R>
where
    R: ScammerRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        id: &str,
        candidate: ScammerCandidate,
    ) -> ScammerResult<ScammerRecord> {
        let id = parse_id(id)?;
        let existing = self.repo.get(id).await?.ok_or(ScammerError::NotFound)?;

        let record = services::revalidate(&existing, &candidate, Utc::now())
            .map_err(ScammerError::Validation)?;

        // Deleted between read and write
        if !self.repo.replace(id, &record).await? {
            return Err(ScammerError::NotFound);
        }

        tracing::info!(scammer_id = %id, "Scammer record updated");

        Ok(record)
    }
}
