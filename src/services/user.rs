use crate::{
    error::{AppError, Result},
    models::user::*,
    services::Database,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

pub const FALLBACK_PENNAME: &str = "사용자";

#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM user_profile WHERE user_id = $user_id",
                json!({ "user_id": user_id }),
            )
            .await?;
        let profiles: Vec<UserProfile> = response.take(0)?;
        Ok(profiles.into_iter().next())
    }

    /// Penname for message composition, falling back to the generic
    /// display name when the profile is missing.
    pub async fn penname_or_default(&self, user_id: &str) -> String {
        match self.get_profile(user_id).await {
            Ok(Some(profile)) => profile.penname,
            Ok(None) => FALLBACK_PENNAME.to_string(),
            Err(e) => {
                debug!("Profile lookup failed for {}: {}", user_id, e);
                FALLBACK_PENNAME.to_string()
            }
        }
    }

    pub async fn get_profiles(&self, user_ids: &[String]) -> Result<Vec<UserProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM user_profile WHERE user_id IN $user_ids",
                json!({ "user_ids": user_ids }),
            )
            .await?;
        let profiles: Vec<UserProfile> = response.take(0)?;
        Ok(profiles)
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile> {
        request.validate().map_err(AppError::ValidatorError)?;

        let profile = self
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User profile"))?;

        let mut updates = serde_json::Map::new();
        if let Some(penname) = &request.penname {
            updates.insert("penname".to_string(), json!(penname));
        }
        if let Some(bio) = &request.bio {
            updates.insert("bio".to_string(), json!(bio));
        }
        updates.insert("updated_at".to_string(), json!(chrono::Utc::now()));

        self.db
            .update_merge("user_profile", &profile.id, serde_json::Value::Object(updates))
            .await?;

        self.get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::internal("Failed to reload profile"))
    }
}
