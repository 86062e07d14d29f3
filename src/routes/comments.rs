use crate::{
    error::Result,
    models::comment::*,
    services::auth::User,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/poem/:poem_id",
            get(get_poem_comments).post(create_comment),
        )
        .route("/:id", put(update_comment).delete(delete_comment))
}

/// List comments on a poem, replies nested
/// GET /api/comments/poem/:poem_id
async fn get_poem_comments(
    State(state): State<Arc<AppState>>,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    let comments = state.comment_service.get_comments_by_poem(&poem_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": comments
    })))
}

/// Create a comment or a reply
/// POST /api/comments/poem/:poem_id
async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<Value>> {
    debug!("Creating comment on poem: {} by user: {}", poem_id, user.id);

    let comment = state
        .comment_service
        .create_comment(&poem_id, &user.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": comment,
        "message": "Comment created successfully"
    })))
}

/// Update a comment
/// PUT /api/comments/:id
async fn update_comment(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(comment_id): Path<String>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<Value>> {
    debug!("Updating comment: {} by user: {}", comment_id, user.id);

    let comment = state
        .comment_service
        .update_comment(&comment_id, &user.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": comment,
        "message": "Comment updated successfully"
    })))
}

/// Delete a comment
/// DELETE /api/comments/:id
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting comment: {} by user: {}", comment_id, user.id);

    state
        .comment_service
        .delete_comment(&comment_id, &user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment deleted successfully"
    })))
}
