//! Monitor subscription handlers: create, list, update, delete.
//!
//! There is no auth layer in front of these routes; the owner is an explicit
//! request field, and every mutating query is owner-scoped in the database.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pulsecheck_core::{validate_subject, validate_threshold, Cadence};
use pulsecheck_db::{MonitorSubscriptionRow, NewSubscription, SubscriptionSettings};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateSubscriptionRequest {
    pub owner_id: Uuid,
    pub subject: String,
    #[serde(default = "default_cadence")]
    pub cadence: String,
    #[serde(default = "default_threshold")]
    pub change_threshold_percent: i32,
    #[serde(default)]
    pub notify_by_email: bool,
    #[serde(default = "default_true")]
    pub notify_in_app: bool,
}

fn default_cadence() -> String {
    "daily".to_string()
}

fn default_threshold() -> i32 {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateSubscriptionRequest {
    pub cadence: Option<String>,
    pub change_threshold_percent: Option<i32>,
    pub notify_by_email: Option<bool>,
    pub notify_in_app: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerQuery {
    pub owner_id: Uuid,
}

#[derive(Debug, Serialize)]
pub(super) struct SubscriptionItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub is_active: bool,
    pub cadence: String,
    pub change_threshold_percent: i32,
    pub notify_by_email: bool,
    pub notify_in_app: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<MonitorSubscriptionRow> for SubscriptionItem {
    fn from(row: MonitorSubscriptionRow) -> Self {
        Self {
            id: row.public_id,
            owner_id: row.owner_id,
            subject: row.subject,
            is_active: row.is_active,
            cadence: row.cadence,
            change_threshold_percent: row.change_threshold_percent,
            notify_by_email: row.notify_by_email,
            notify_in_app: row.notify_in_app,
            last_run_at: row.last_run_at,
            last_score: row.last_score,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_cadence(req_id: &str, value: &str) -> Result<(), ApiError> {
    value
        .parse::<Cadence>()
        .map(|_| ())
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/subscriptions: create a subscription.
pub(super) async fn create_subscription(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriptionItem>>), ApiError> {
    let rid = &req_id.0;

    let subject = body.subject.trim().to_owned();
    validate_subject(&subject)
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;
    validate_threshold(body.change_threshold_percent)
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;
    validate_cadence(rid, &body.cadence)?;

    let row = pulsecheck_db::create_subscription(
        &state.pool,
        &NewSubscription {
            owner_id: body.owner_id,
            subject,
            cadence: body.cadence,
            change_threshold_percent: body.change_threshold_percent,
            notify_by_email: body.notify_by_email,
            notify_in_app: body.notify_in_app,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SubscriptionItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/subscriptions?owner_id=: list an owner's subscriptions.
pub(super) async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Vec<SubscriptionItem>>>, ApiError> {
    let rows = pulsecheck_db::list_subscriptions_by_owner(&state.pool, query.owner_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(SubscriptionItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/subscriptions/{public_id}?owner_id=: update settings.
pub(super) async fn update_subscription(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
    Json(body): Json<UpdateSubscriptionRequest>,
) -> Result<Json<ApiResponse<SubscriptionItem>>, ApiError> {
    let rid = &req_id.0;

    if let Some(threshold) = body.change_threshold_percent {
        validate_threshold(threshold)
            .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;
    }
    if let Some(cadence) = &body.cadence {
        validate_cadence(rid, cadence)?;
    }

    let settings = SubscriptionSettings {
        cadence: body.cadence,
        change_threshold_percent: body.change_threshold_percent,
        notify_by_email: body.notify_by_email,
        notify_in_app: body.notify_in_app,
        is_active: body.is_active,
    };

    let row =
        pulsecheck_db::update_subscription_settings(&state.pool, public_id, query.owner_id, &settings)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?
            .ok_or_else(|| ApiError::new(rid, "not_found", "subscription not found"))?;

    Ok(Json(ApiResponse {
        data: SubscriptionItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/subscriptions/{public_id}?owner_id=: delete.
pub(super) async fn delete_subscription(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<StatusCode, ApiError> {
    let removed = pulsecheck_db::delete_subscription(&state.pool, public_id, query.owner_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new(req_id.0, "not_found", "subscription not found"))
    }
}
