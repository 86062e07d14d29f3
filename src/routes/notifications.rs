use crate::{
    error::Result,
    services::auth::User,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_notifications))
        .route("/unread-count", get(get_unread_count))
        .route("/read-all", put(mark_all_as_read))
        .route("/:id/read", put(mark_as_read))
        .route("/:id", delete(delete_notification))
}

/// List the caller's notifications, newest first
/// GET /api/notifications
async fn get_notifications(
    State(state): State<Arc<AppState>>,
    user: User,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Value>> {
    debug!("Getting notifications for user: {}", user.id);

    let page = state
        .notification_service
        .list_notifications(&user.id, query.page, query.limit)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": page
    })))
}

/// Count of unread notifications
/// GET /api/notifications/unread-count
async fn get_unread_count(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Value>> {
    let count = state.notification_service.unread_count(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "unread_count": count
        }
    })))
}

/// Mark one notification as read
/// PUT /api/notifications/:id/read
async fn mark_as_read(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>> {
    let notification = state
        .notification_service
        .mark_as_read(&notification_id, &user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": notification
    })))
}

/// Mark every notification as read
/// PUT /api/notifications/read-all
async fn mark_all_as_read(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Value>> {
    state.notification_service.mark_all_as_read(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "All notifications marked as read"
    })))
}

/// Delete a notification
/// DELETE /api/notifications/:id
async fn delete_notification(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting notification: {} by user: {}", notification_id, user.id);

    state
        .notification_service
        .delete_notification(&notification_id, &user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Notification deleted successfully"
    })))
}
