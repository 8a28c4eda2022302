//! Stored sentiment summary read handlers.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SummariesQuery {
    pub owner_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SummaryItem {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub subject: String,
    pub overall: String,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub narrative: String,
    pub key_themes: Value,
    pub total_analyzed: i32,
    pub created_at: DateTime<Utc>,
}

/// GET /api/v1/summaries: recent stored summaries, optionally per owner.
pub(super) async fn list_summaries(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SummariesQuery>,
) -> Result<Json<ApiResponse<Vec<SummaryItem>>>, ApiError> {
    let rows = pulsecheck_db::list_recent_summaries(
        &state.pool,
        query.owner_id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SummaryItem {
            id: row.public_id,
            owner_id: row.owner_id,
            subject: row.subject,
            overall: row.overall,
            positive_ratio: row.positive_ratio,
            negative_ratio: row.negative_ratio,
            neutral_ratio: row.neutral_ratio,
            narrative: row.narrative,
            key_themes: row.key_themes,
            total_analyzed: row.total_analyzed,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
