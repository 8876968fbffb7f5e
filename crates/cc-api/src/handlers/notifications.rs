//! Notification handlers. All routes operate on the caller's own inbox.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    actor: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let notifications = state
        .notifications
        .list_by_recipient(&actor.user.id)
        .await?;

    let unread = notifications.iter().filter(|n| !n.read).count();

    Ok(Json(json!({
        "success": true,
        "count": notifications.len(),
        "unreadCount": unread,
        "data": notifications,
    })))
}

/// PUT /api/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let notification = state
        .notifications
        .get(&notification_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;

    if notification.recipient_id != actor.user.id {
        return Err(ApiError::forbidden("Not authorized to access this resource"));
    }

    state.notifications.mark_read(&notification_id).await?;

    Ok(Json(json!({ "success": true, "message": "Notification marked as read" })))
}

/// DELETE /api/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let notification = state
        .notifications
        .get(&notification_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;

    if notification.recipient_id != actor.user.id {
        return Err(ApiError::forbidden("Not authorized to access this resource"));
    }

    state.notifications.delete(&notification_id).await?;

    Ok(Json(json!({ "success": true, "message": "Notification removed" })))
}
