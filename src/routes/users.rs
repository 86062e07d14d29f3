use crate::{
    error::{AppError, Result},
    models::user::UpdateProfileRequest,
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
        .route("/me/profile", put(update_my_profile))
        .route("/:user_id/profile", get(get_profile))
}

/// Get a user's public profile
/// GET /api/users/:user_id/profile
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let profile = state
        .user_service
        .get_profile(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User profile"))?;

    Ok(Json(json!({
        "success": true,
        "data": profile
    })))
}

/// Update the caller's profile
/// PUT /api/users/me/profile
async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    debug!("Updating profile for user: {}", user.id);

    let profile = state.user_service.update_profile(&user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": profile,
        "message": "Profile updated successfully"
    })))
}
