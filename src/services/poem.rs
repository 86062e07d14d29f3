use crate::{
    error::{AppError, Result},
    models::poem::*,
    services::{Database, UserService},
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct PoemService {
    db: Arc<Database>,
    user_service: UserService,
}

impl PoemService {
    pub async fn new(db: Arc<Database>, user_service: UserService) -> Result<Self> {
        Ok(Self { db, user_service })
    }

    pub async fn create_poem(&self, author_id: &str, request: CreatePoemRequest) -> Result<Poem> {
        debug!("Creating poem for user: {}", author_id);

        request.validate().map_err(AppError::ValidatorError)?;

        let penname = self.user_service.penname_or_default(author_id).await;

        let poem = Poem {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            title: request.title,
            content: request.content,
            penname_at_creation: penname,
            emotion_tags: request.emotion_tags,
            is_public: request.is_public,
            likes_count: 0,
            bookmarks_count: 0,
            comments_count: 0,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.db.create("poem", &poem.id, &poem).await?;

        info!("Created poem {} by {}", poem.id, author_id);
        Ok(poem)
    }

    pub async fn get_poem(&self, poem_id: &str) -> Result<Option<Poem>> {
        let poem: Option<Poem> = self.db.get_by_id("poem", poem_id).await?;
        Ok(poem.filter(|p| !p.is_deleted))
    }

    pub async fn get_public_poems(&self, page: Option<usize>, limit: Option<usize>) -> Result<Vec<Poem>> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(20).min(100);
        let offset = (page - 1) * limit;

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM poem
                    WHERE is_public = true AND is_deleted = false
                    ORDER BY created_at DESC
                    LIMIT $limit START $offset
                "#,
                json!({ "limit": limit, "offset": offset }),
            )
            .await?;
        let poems: Vec<Poem> = response.take(0)?;
        Ok(poems)
    }

    /// All poems by one author, newest first. Also the read path the
    /// analytics aggregator runs over.
    pub async fn get_poems_by_author(&self, author_id: &str) -> Result<Vec<Poem>> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM poem
                    WHERE author_id = $author_id AND is_deleted = false
                    ORDER BY created_at DESC
                "#,
                json!({ "author_id": author_id }),
            )
            .await?;
        let poems: Vec<Poem> = response.take(0)?;
        Ok(poems)
    }

    pub async fn update_poem(
        &self,
        poem_id: &str,
        user_id: &str,
        request: UpdatePoemRequest,
    ) -> Result<Poem> {
        request.validate().map_err(AppError::ValidatorError)?;

        let poem = self
            .get_poem(poem_id)
            .await?
            .ok_or_else(|| AppError::not_found("Poem"))?;

        if poem.author_id != user_id {
            return Err(AppError::forbidden("You can only edit your own poems"));
        }

        let mut updates = serde_json::Map::new();
        if let Some(title) = &request.title {
            updates.insert("title".to_string(), json!(title));
        }
        if let Some(content) = &request.content {
            updates.insert("content".to_string(), json!(content));
        }
        if let Some(emotion_tags) = &request.emotion_tags {
            updates.insert("emotion_tags".to_string(), json!(emotion_tags));
        }
        if let Some(is_public) = request.is_public {
            updates.insert("is_public".to_string(), json!(is_public));
        }
        updates.insert("updated_at".to_string(), json!(Utc::now()));

        self.db
            .update_merge("poem", poem_id, serde_json::Value::Object(updates))
            .await?;

        self.get_poem(poem_id)
            .await?
            .ok_or_else(|| AppError::internal("Failed to reload poem"))
    }

    pub async fn delete_poem(&self, poem_id: &str, user_id: &str) -> Result<()> {
        let poem = self
            .get_poem(poem_id)
            .await?
            .ok_or_else(|| AppError::not_found("Poem"))?;

        if poem.author_id != user_id {
            return Err(AppError::forbidden("You can only delete your own poems"));
        }

        self.db
            .update_merge(
                "poem",
                poem_id,
                json!({ "is_deleted": true, "updated_at": Utc::now() }),
            )
            .await
    }

    /// Best-effort counter bump; no transactional guard against concurrent
    /// writers.
    pub async fn increment_counter(&self, poem_id: &str, field: &str) -> Result<()> {
        let sql = format!(
            "UPDATE type::thing('poem', $id) SET {} += 1, updated_at = time::now()",
            field
        );
        self.db
            .query_with_params(&sql, json!({ "id": poem_id }))
            .await?;
        Ok(())
    }

    pub async fn decrement_counter(&self, poem_id: &str, field: &str) -> Result<()> {
        let sql = format!(
            "UPDATE type::thing('poem', $id) SET {field} = math::max([{field} - 1, 0]), updated_at = time::now()",
            field = field
        );
        self.db
            .query_with_params(&sql, json!({ "id": poem_id }))
            .await?;
        Ok(())
    }
}
