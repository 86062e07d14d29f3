use crate::{
    error::{AppError, Result},
    models::poem::*,
    services::auth::User,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::utils::middleware::OptionalAuth;

#[derive(Debug, Deserialize)]
pub struct PoemQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_public_poems).post(create_poem))
        .route("/mine", get(get_my_poems))
        .route(
            "/:id",
            get(get_poem).put(update_poem).delete(delete_poem),
        )
}

/// List public poems
/// GET /api/poems
async fn get_public_poems(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoemQuery>,
) -> Result<Json<Value>> {
    let poems = state
        .poem_service
        .get_public_poems(query.page, query.limit)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": poems
    })))
}

/// Create a poem
/// POST /api/poems
async fn create_poem(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<CreatePoemRequest>,
) -> Result<Json<Value>> {
    debug!("Creating poem for user: {}", user.id);

    let poem = state.poem_service.create_poem(&user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": poem,
        "message": "Poem created successfully"
    })))
}

/// List the caller's own poems, private ones included
/// GET /api/poems/mine
async fn get_my_poems(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Value>> {
    let poems = state.poem_service.get_poems_by_author(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": poems
    })))
}

/// Get a single poem
/// GET /api/poems/:id
async fn get_poem(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    let poem = state
        .poem_service
        .get_poem(&poem_id)
        .await?
        .ok_or_else(|| AppError::not_found("Poem"))?;

    // Private poems are visible to their author only
    if !poem.is_public && user.as_ref().map(|u| u.id.as_str()) != Some(poem.author_id.as_str()) {
        return Err(AppError::not_found("Poem"));
    }

    Ok(Json(json!({
        "success": true,
        "data": poem
    })))
}

/// Update a poem
/// PUT /api/poems/:id
async fn update_poem(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
    Json(request): Json<UpdatePoemRequest>,
) -> Result<Json<Value>> {
    debug!("Updating poem: {} by user: {}", poem_id, user.id);

    let poem = state
        .poem_service
        .update_poem(&poem_id, &user.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": poem,
        "message": "Poem updated successfully"
    })))
}

/// Delete a poem
/// DELETE /api/poems/:id
async fn delete_poem(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(poem_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting poem: {} by user: {}", poem_id, user.id);

    state.poem_service.delete_poem(&poem_id, &user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Poem deleted successfully"
    })))
}
