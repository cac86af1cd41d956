//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::application::{
    CreateScammerUseCase, GetScammerUseCase, ListScammersUseCase, ScammerConfig,
    UpdateScammerUseCase,
};
use crate::domain::entities::{ScammerCandidate, ScammerRecord};
use crate::domain::repository::ScammerRepository;
use crate::error::{ScammerError, ScammerResult};
use crate::presentation::dto::{CreatedResponse, ListQuery};

/// Shared state for scammer handlers
pub struct ScammerAppState<R> {
    pub repo: Arc<R>,
    pub config: Arc<ScammerConfig>,
}

impl<R> Clone for ScammerAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Record body; an unreadable body is a validation failure like any other
#[derive(FromRequest, Deserialize)]
#[from_request(via(Json), rejection(ScammerError))]
pub struct CandidateJson(pub ScammerCandidate);

/// POST /scammers/
pub async fn create_scammer<R>(
    State(state): State<ScammerAppState<R>>,
    CandidateJson(candidate): CandidateJson,
) -> ScammerResult<(StatusCode, Json<CreatedResponse>)>
where
    R: ScammerRepository + Send + Sync + 'static,
{
    let id = CreateScammerUseCase::new(state.repo.clone())
        .execute(candidate)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_string() }),
    ))
}

/// GET /scammers/
pub async fn list_scammers<R>(
    State(state): State<ScammerAppState<R>>,
    Query(query): Query<ListQuery>,
) -> ScammerResult<Json<Vec<ScammerRecord>>>
where
    R: ScammerRepository + Send + Sync + 'static,
{
    let records = ListScammersUseCase::new(state.repo.clone(), state.config.clone())
        .execute(query.into())
        .await?;

    Ok(Json(records))
}

/// GET /scammers/{id}
pub async fn get_scammer<R>(
    State(state): State<ScammerAppState<R>>,
    Path(id): Path<String>,
) -> ScammerResult<Json<ScammerRecord>>
where
    R: ScammerRepository + Send + Sync + 'static,
{
    let record = GetScammerUseCase::new(state.repo.clone())
        .execute(&id)
        .await?;

    Ok(Json(record))
}

/// PUT /scammers/{id}
pub async fn update_scammer<R>(
    State(state): State<ScammerAppState<R>>,
    Path(id): Path<String>,
    CandidateJson(candidate): CandidateJson,
) -> ScammerResult<Json<ScammerRecord>>
where
    R: ScammerRepository + Send + Sync + 'static,
{
    let record = UpdateScammerUseCase::new(state.repo.clone())
        .execute(&id, candidate)
        .await?;

    Ok(Json(record))
}
