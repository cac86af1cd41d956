//! Create Scammer Use Case

use std::sync::Arc;

use kernel::id::ScammerId;

use crate::domain::entities::ScammerCandidate;
use crate::domain::repository::ScammerRepository;
use crate::domain::services;
use crate::error::{ScammerError, ScammerResult};

/// Create Scammer Use Case
pub struct CreateScammerUseCase<R>
where
    R: ScammerRepository,
{
    repo: Arc<R>,
}

impl<R> CreateScammerUseCase<R>
where
    R: ScammerRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, candidate: ScammerCandidate) -> ScammerResult<ScammerId> {
        let record = services::validate(&candidate).map_err(ScammerError::Validation)?;

        let id = self.repo.insert(&record).await?;

        tracing::info!(
            scammer_id = %id,
            threat_level = record.threat_level,
            status = %record.status,
            "Scammer record created"
        );

        Ok(id)
    }
}
