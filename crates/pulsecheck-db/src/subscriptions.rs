//! Database operations for the `monitor_subscriptions` table.
//!
//! All mutating queries are owner-scoped: a subscription row can only be
//! changed or removed through its `owner_id`, which itself never changes.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `monitor_subscriptions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonitorSubscriptionRow {
    pub id: i64,
    pub public_id: Uuid,
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
    pub updated_at: DateTime<Utc>,
}

/// Values for a new subscription.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub owner_id: Uuid,
    pub subject: String,
    pub cadence: String,
    pub change_threshold_percent: i32,
    pub notify_by_email: bool,
    pub notify_in_app: bool,
}

/// Partial settings update. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSettings {
    pub cadence: Option<String>,
    pub change_threshold_percent: Option<i32>,
    pub notify_by_email: Option<bool>,
    pub notify_in_app: Option<bool>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const SUBSCRIPTION_COLUMNS: &str = "id, public_id, owner_id, subject, is_active, cadence, \
     change_threshold_percent, notify_by_email, notify_in_app, last_run_at, last_score, \
     created_at, updated_at";

/// Insert a new subscription and return the created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including the CHECK
/// constraints on cadence and threshold).
pub async fn create_subscription(
    pool: &PgPool,
    new: &NewSubscription,
) -> Result<MonitorSubscriptionRow, DbError> {
    let row = sqlx::query_as::<_, MonitorSubscriptionRow>(&format!(
        "INSERT INTO monitor_subscriptions \
             (owner_id, subject, cadence, change_threshold_percent, \
              notify_by_email, notify_in_app) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {SUBSCRIPTION_COLUMNS}"
    ))
    .bind(new.owner_id)
    .bind(&new.subject)
    .bind(&new.cadence)
    .bind(new.change_threshold_percent)
    .bind(new.notify_by_email)
    .bind(new.notify_in_app)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// List all active subscriptions, oldest-created first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_subscriptions(
    pool: &PgPool,
) -> Result<Vec<MonitorSubscriptionRow>, DbError> {
    let rows = sqlx::query_as::<_, MonitorSubscriptionRow>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} \
         FROM monitor_subscriptions \
         WHERE is_active = TRUE \
         ORDER BY created_at ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List an owner's subscriptions, newest-created first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_subscriptions_by_owner(
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<Vec<MonitorSubscriptionRow>, DbError> {
    let rows = sqlx::query_as::<_, MonitorSubscriptionRow>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} \
         FROM monitor_subscriptions \
         WHERE owner_id = $1 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch one subscription by public id, scoped to its owner.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_subscription(
    pool: &PgPool,
    public_id: Uuid,
    owner_id: Uuid,
) -> Result<Option<MonitorSubscriptionRow>, DbError> {
    let row = sqlx::query_as::<_, MonitorSubscriptionRow>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} \
         FROM monitor_subscriptions \
         WHERE public_id = $1 AND owner_id = $2"
    ))
    .bind(public_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Apply a partial settings update, scoped to the owner. Returns the updated
/// row, or `None` when no matching subscription exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_subscription_settings(
    pool: &PgPool,
    public_id: Uuid,
    owner_id: Uuid,
    settings: &SubscriptionSettings,
) -> Result<Option<MonitorSubscriptionRow>, DbError> {
    let row = sqlx::query_as::<_, MonitorSubscriptionRow>(&format!(
        "UPDATE monitor_subscriptions SET \
             cadence = COALESCE($3, cadence), \
             change_threshold_percent = COALESCE($4, change_threshold_percent), \
             notify_by_email = COALESCE($5, notify_by_email), \
             notify_in_app = COALESCE($6, notify_in_app), \
             is_active = COALESCE($7, is_active), \
             updated_at = now() \
         WHERE public_id = $1 AND owner_id = $2 \
         RETURNING {SUBSCRIPTION_COLUMNS}"
    ))
    .bind(public_id)
    .bind(owner_id)
    .bind(settings.cadence.as_deref())
    .bind(settings.change_threshold_percent)
    .bind(settings.notify_by_email)
    .bind(settings.notify_in_app)
    .bind(settings.is_active)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Record a completed run: sets `last_run_at` and `last_score`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_subscription_run(
    pool: &PgPool,
    id: i64,
    last_run_at: DateTime<Utc>,
    last_score: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE monitor_subscriptions SET \
             last_run_at = $2, last_score = $3, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(last_run_at)
    .bind(last_score)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a subscription, scoped to the owner. Returns `true` when a row was
/// removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_subscription(
    pool: &PgPool,
    public_id: Uuid,
    owner_id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "DELETE FROM monitor_subscriptions WHERE public_id = $1 AND owner_id = $2",
    )
    .bind(public_id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
