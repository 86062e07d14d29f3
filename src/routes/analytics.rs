use crate::{
    error::Result,
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
    Router::new()
        .route("/emotions", get(get_emotion_stats))
        .route("/words", get(get_frequent_words))
}

/// Emotion distribution across the caller's poems
/// GET /api/analytics/emotions
async fn get_emotion_stats(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Value>> {
    debug!("Computing emotion stats for user: {}", user.id);

    let stats = state.analytics_service.emotion_stats(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": stats
    })))
}

/// Most frequent words across the caller's poems
/// GET /api/analytics/words
async fn get_frequent_words(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Value>> {
    debug!("Computing frequent words for user: {}", user.id);

    let words = state.analytics_service.frequent_words(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": words
    })))
}
