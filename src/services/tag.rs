use crate::{
    error::{AppError, Result},
    models::tag::*,
    services::Database,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct TagService {
    db: Arc<Database>,
}

impl TagService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// Built-in catalog merged with custom tags. A custom tag whose name
    /// collides with a built-in one is dropped from the merged list.
    pub async fn list_tags(&self) -> Result<Vec<EmotionTag>> {
        let mut tags = builtin_tags();

        let customs = self.get_custom_tags().await?;
        for custom in customs {
            if builtin_by_name(&custom.name).is_none() {
                tags.push(EmotionTag {
                    id: custom.id,
                    name: custom.name,
                    color: custom.color,
                });
            }
        }

        Ok(tags)
    }

    pub async fn get_custom_tags(&self) -> Result<Vec<CustomEmotionTag>> {
        let mut response = self
            .db
            .query(
                r#"
                    SELECT *, meta::id(id) AS id FROM emotion_tag
                    ORDER BY created_at ASC
                "#,
            )
            .await?;
        let tags: Vec<CustomEmotionTag> = response.take(0)?;
        Ok(tags)
    }

    /// Creating an already-known name returns the existing tag rather than
    /// erroring, so tag creation from the composer screen is idempotent.
    pub async fn create_custom_tag(&self, request: CreateEmotionTagRequest) -> Result<EmotionTag> {
        request.validate().map_err(AppError::ValidatorError)?;

        let name = request.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(AppError::bad_request("Tag name cannot be empty"));
        }

        if let Some(builtin) = builtin_by_name(&name) {
            return Ok(builtin);
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM emotion_tag WHERE name = $name",
                json!({ "name": &name }),
            )
            .await?;
        let existing: Vec<CustomEmotionTag> = response.take(0)?;
        if let Some(existing) = existing.into_iter().next() {
            debug!("Custom tag '{}' already exists", name);
            return Ok(EmotionTag {
                id: existing.id,
                name: existing.name,
                color: existing.color,
            });
        }

        let tag = CustomEmotionTag {
            id: Uuid::new_v4().to_string(),
            name,
            color: DEFAULT_TAG_COLOR.to_string(),
            created_at: Utc::now(),
        };
        self.db.create("emotion_tag", &tag.id, &tag).await?;

        Ok(EmotionTag {
            id: tag.id,
            name: tag.name,
            color: tag.color,
        })
    }
}
