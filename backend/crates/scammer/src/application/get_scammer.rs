//! Get Scammer Use Case

use std::sync::Arc;

use kernel::id::ScammerId;

use crate::domain::entities::ScammerRecord;
use crate::domain::repository::ScammerRepository;
use crate::error::{ScammerError, ScammerResult};

/// Parse a record id from a path segment
pub fn parse_id(raw: &str) -> ScammerResult<ScammerId> {
    raw.trim()
        .parse()
        .map_err(|e: uuid::Error| ScammerError::InvalidId(e.to_string()))
}

/// Get Scammer Use Case
pub struct GetScammerUseCase<R>
where
    R: ScammerRepository,
{
    repo: Arc<R>,
}

impl<R> GetScammerUseCase<R>
where
    R: ScammerRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: &str) -> ScammerResult<ScammerRecord> {
        let id = parse_id(id)?;
        self.repo.get(id).await?.ok_or(ScammerError::NotFound)
    }
}
