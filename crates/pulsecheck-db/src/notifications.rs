//! Database operations for the in-app `notifications` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `notifications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: i64,
    pub owner_id: Uuid,
    pub subject: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert an in-app notification and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_notification(
    pool: &PgPool,
    owner_id: Uuid,
    subject: &str,
    title: &str,
    body: &str,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO notifications (owner_id, subject, title, body) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(owner_id)
    .bind(subject)
    .bind(title)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List an owner's unread notifications, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unread_notifications(
    pool: &PgPool,
    owner_id: Uuid,
    limit: i64,
) -> Result<Vec<NotificationRow>, DbError> {
    let rows = sqlx::query_as::<_, NotificationRow>(
        "SELECT id, owner_id, subject, title, body, is_read, created_at \
         FROM notifications \
         WHERE owner_id = $1 AND is_read = FALSE \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(owner_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mark one notification read, scoped to the owner. Returns `true` when a
/// row was updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_notification_read(
    pool: &PgPool,
    id: i64,
    owner_id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
