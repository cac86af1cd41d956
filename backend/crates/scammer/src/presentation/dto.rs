//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::ListScammersInput;

/// Create response
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// `GET /scammers/` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub scam_type: Option<String>,
    pub country: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

impl From<ListQuery> for ListScammersInput {
    fn from(query: ListQuery) -> Self {
        Self {
            status: query.status,
            scam_type: query.scam_type,
            country: query.country,
            sort: query.sort,
            limit: query.limit,
        }
    }
}
