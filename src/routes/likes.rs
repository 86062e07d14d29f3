use crate::{
    error::Result,
    models::like::LikeStatus,
    services::auth::User,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/poem/:poem_id",
            get(get_poem_likes).post(add_like).delete(remove_like),
        )
        .route("/check/:poem_id", get(check_like))
        .route("/mine", get(get_my_likes))
}

/// List likes on a poem
/// GET /api/likes/poem/:poem_id
async fn get_poem_likes(
    State(state): State<Arc<AppState>>,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    let likes = state.like_service.get_likes_by_poem(&poem_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": likes
    })))
}

/// Like a poem
/// POST /api/likes/poem/:poem_id
async fn add_like(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} liking poem {}", user.id, poem_id);

    state.like_service.add_like(&poem_id, &user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Poem liked successfully"
    })))
}

/// Remove a like
/// DELETE /api/likes/poem/:poem_id
async fn remove_like(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} unliking poem {}", user.id, poem_id);

    state.like_service.remove_like(&poem_id, &user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Like removed successfully"
    })))
}

/// Check whether the caller has liked a poem
/// GET /api/likes/check/:poem_id
async fn check_like(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    let is_liked = state.like_service.is_liked(&poem_id, &user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": LikeStatus { is_liked }
    })))
}

/// List the caller's likes
/// GET /api/likes/mine
async fn get_my_likes(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Value>> {
    let likes = state.like_service.get_likes_by_user(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": likes
    })))
}
