use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use pulsecheck_analysis::TrendPoint;
use pulsecheck_monitor::{get_trend, MonitorError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct TrendQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/trend/{subject}: trend history, most recent first.
pub(super) async fn get_trend_points(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(subject): Path<String>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<ApiResponse<Vec<TrendPoint>>>, ApiError> {
    let points = get_trend(&state.deps, &subject, Some(normalize_limit(query.limit)))
        .await
        .map_err(|e| match e {
            MonitorError::Validation(v) => {
                ApiError::new(req_id.0.clone(), "validation_error", v.to_string())
            }
            other => {
                tracing::error!(error = %other, "trend read failed");
                ApiError::new(req_id.0.clone(), "internal_error", "trend read failed")
            }
        })?;

    Ok(Json(ApiResponse {
        data: points,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, serde::Serialize)]
pub(super) struct LatestTrendItem {
    pub subject: String,
    pub overall_score: i32,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub total_count: i32,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// GET /api/v1/trend/{subject}/latest: the newest trend point, if any.
pub(super) async fn get_latest_trend_point(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(subject): Path<String>,
) -> Result<Json<ApiResponse<LatestTrendItem>>, ApiError> {
    let row = pulsecheck_db::get_latest_trend_point(&state.pool, &subject)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no trend history"))?;

    Ok(Json(ApiResponse {
        data: LatestTrendItem {
            subject: row.subject,
            overall_score: row.overall_score,
            positive_ratio: row.positive_ratio,
            negative_ratio: row.negative_ratio,
            neutral_ratio: row.neutral_ratio,
            total_count: row.total_count,
            recorded_at: row.recorded_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
