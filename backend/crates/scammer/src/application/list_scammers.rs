//! List Scammers Use Case

use std::sync::Arc;

use crate::application::config::ScammerConfig;
use crate::domain::entities::{ScammerRecord, ValidationError};
use crate::domain::repository::ScammerRepository;
use crate::domain::value_objects::{ScamType, ScammerQuery, ScammerSort, ScammerStatus};
use crate::error::{ScammerError, ScammerResult};

/// Raw listing parameters
#[derive(Debug, Clone, Default)]
pub struct ListScammersInput {
    pub status: Option<String>,
    pub scam_type: Option<String>,
    pub country: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

/// List Scammers Use Case
pub struct ListScammersUseCase<R>
where
    R: ScammerRepository,
{
    repo: Arc<R>,
    config: Arc<ScammerConfig>,
}

impl<R> ListScammersUseCase<R>
where
    R: ScammerRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ScammerConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: ListScammersInput) -> ScammerResult<Vec<ScammerRecord>> {
        let query = self.parse(input)?;
        let records = self.repo.list(&query).await?;
        tracing::debug!(count = records.len(), "Scammer records listed");
        Ok(records)
    }

    fn parse(&self, input: ListScammersInput) -> ScammerResult<ScammerQuery> {
        let mut errors = Vec::new();

        let status = input
            .status
            .as_deref()
            .and_then(|s| parse_field::<ScammerStatus>("status", s, &mut errors));
        let scam_type = input
            .scam_type
            .as_deref()
            .and_then(|s| parse_field::<ScamType>("scamType", s, &mut errors));
        let sort = input
            .sort
            .as_deref()
            .and_then(|s| parse_field::<ScammerSort>("sort", s, &mut errors))
            .unwrap_or_default();
        let limit = match self.config.list_limit(input.limit) {
            Some(limit) => limit,
            None => {
                errors.push(ValidationError::new(
                    "limit",
                    "Input should be greater than 0",
                ));
                0
            }
        };

        if !errors.is_empty() {
            return Err(ScammerError::Validation(errors));
        }

        Ok(ScammerQuery {
            status,
            scam_type,
            country: input.country.filter(|c| !c.is_empty()),
            sort,
            limit,
        })
    }
}

fn parse_field<T>(field: &str, raw: &str, errors: &mut Vec<ValidationError>) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| errors.push(ValidationError::new(field, e.to_string())))
        .ok()
}
