use crate::{
    error::Result,
    models::follow::FollowStatus,
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
        .route("/:user_id", post(follow_user).delete(unfollow_user))
        .route("/check/:user_id", get(check_follow))
        .route("/followers/:user_id", get(get_followers))
        .route("/following/:user_id", get(get_following))
        .route("/stats/:user_id", get(get_stats))
}

/// Follow a user
/// POST /api/follows/:user_id
async fn follow_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(target_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} following {}", user.id, target_id);

    state.follow_service.follow(&user.id, &target_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Followed successfully"
    })))
}

/// Unfollow a user
/// DELETE /api/follows/:user_id
async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(target_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} unfollowing {}", user.id, target_id);

    state.follow_service.unfollow(&user.id, &target_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Unfollowed successfully"
    })))
}

/// Check whether the caller follows a user
/// GET /api/follows/check/:user_id
async fn check_follow(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(target_id): Path<String>,
) -> Result<Json<Value>> {
    let is_following = state
        .follow_service
        .is_following(&user.id, &target_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": FollowStatus { is_following }
    })))
}

/// List a user's followers
/// GET /api/follows/followers/:user_id
async fn get_followers(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let followers = state.follow_service.get_followers(&user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": followers
    })))
}

/// List the users someone follows
/// GET /api/follows/following/:user_id
async fn get_following(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let following = state.follow_service.get_following(&user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": following
    })))
}

/// Follower and following counts
/// GET /api/follows/stats/:user_id
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let stats = state.follow_service.get_stats(&user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": stats
    })))
}
