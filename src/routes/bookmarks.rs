use crate::{
    error::Result,
    models::bookmark::BookmarkStatus,
    services::auth::User,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_my_bookmarks))
        .route(
            "/poem/:poem_id",
            post(add_bookmark).delete(remove_bookmark),
        )
        .route("/check/:poem_id", get(check_bookmark))
}

/// List the caller's bookmarks
/// GET /api/bookmarks
async fn get_my_bookmarks(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Value>> {
    debug!("Getting bookmarks for user: {}", user.id);

    let bookmarks = state
        .bookmark_service
        .get_bookmarks_by_user(&user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": bookmarks
    })))
}

/// Bookmark a poem
/// POST /api/bookmarks/poem/:poem_id
async fn add_bookmark(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} bookmarking poem {}", user.id, poem_id);

    state
        .bookmark_service
        .add_bookmark(&poem_id, &user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Poem bookmarked successfully"
    })))
}

/// Remove a bookmark
/// DELETE /api/bookmarks/poem/:poem_id
async fn remove_bookmark(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} removing bookmark on poem {}", user.id, poem_id);

    state
        .bookmark_service
        .remove_bookmark(&poem_id, &user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Bookmark removed successfully"
    })))
}

/// Check whether the caller has bookmarked a poem
/// GET /api/bookmarks/check/:poem_id
async fn check_bookmark(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    let is_bookmarked = state
        .bookmark_service
        .is_bookmarked(&poem_id, &user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": BookmarkStatus { is_bookmarked }
    })))
}
