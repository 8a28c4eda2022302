//! In-app notification handlers: the read side of the in-app channel.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct NotificationsQuery {
    pub owner_id: Uuid,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct NotificationItem {
    pub id: i64,
    pub subject: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// GET /api/v1/notifications?owner_id=: unread notifications, newest first.
pub(super) async fn list_notifications(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationItem>>>, ApiError> {
    let rows = pulsecheck_db::list_unread_notifications(
        &state.pool,
        query.owner_id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| NotificationItem {
            id: row.id,
            subject: row.subject,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerQuery {
    pub owner_id: Uuid,
}

/// POST /api/v1/notifications/{id}/read: mark one notification read.
pub(super) async fn mark_read(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let updated = pulsecheck_db::mark_notification_read(&state.pool, id, query.owner_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if !updated {
        return Err(ApiError::new(req_id.0, "not_found", "notification not found"));
    }

    Ok(Json(ApiResponse {
        data: true,
        meta: ResponseMeta::new(req_id.0),
    }))
}
