use crate::{
    error::Result,
    models::tag::CreateEmotionTagRequest,
    services::auth::User,
    state::AppState,
};
use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_tags).post(create_tag))
}

/// List emotion tags, built-ins first
/// GET /api/tags
async fn get_tags(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let tags = state.tag_service.list_tags().await?;

    Ok(Json(json!({
        "success": true,
        "data": tags
    })))
}

/// Create a custom emotion tag
/// POST /api/tags
async fn create_tag(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<CreateEmotionTagRequest>,
) -> Result<Json<Value>> {
    debug!("User {} creating emotion tag '{}'", user.id, request.name);

    let tag = state.tag_service.create_custom_tag(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": tag
    })))
}
