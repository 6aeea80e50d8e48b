//! Notification handlers
//!
//! Read state is per recipient; marking read is idempotent and rows
//! are never deleted.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use pressroom_common::{auth::AuthContext, db::models::Notification, errors::Result};

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub article_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            article_id: notification.article_id,
            message: notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// List the actor's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<NotificationResponse>>> {
    let notifications = state.repo.list_notifications(auth.user_id).await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Mark one notification read (idempotent)
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<NotificationResponse>> {
    let notification = state
        .repo
        .mark_notification_read(notification_id, auth.user_id)
        .await?;

    Ok(Json(notification.into()))
}

/// Mark all of the actor's notifications read
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<MarkAllReadResponse>> {
    let updated = state.repo.mark_all_notifications_read(auth.user_id).await?;

    Ok(Json(MarkAllReadResponse { updated }))
}
