use crate::{
    error::{AppError, Result},
    models::{
        bookmark::*,
        notification::{EntityKind, NotificationKind, NotificationPayload},
        poem::Poem,
    },
    services::{Database, NotificationService, PoemService, UserService},
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct BookmarkService {
    db: Arc<Database>,
    poem_service: PoemService,
    user_service: UserService,
    notification_service: NotificationService,
}

impl BookmarkService {
    pub async fn new(
        db: Arc<Database>,
        poem_service: PoemService,
        user_service: UserService,
        notification_service: NotificationService,
    ) -> Result<Self> {
        Ok(Self {
            db,
            poem_service,
            user_service,
            notification_service,
        })
    }

    pub async fn add_bookmark(&self, poem_id: &str, user_id: &str) -> Result<()> {
        debug!("User {} bookmarking poem {}", user_id, poem_id);

        let poem = self
            .poem_service
            .get_poem(poem_id)
            .await?
            .ok_or_else(|| AppError::not_found("Poem"))?;

        if self.is_bookmarked(poem_id, user_id).await? {
            return Err(AppError::conflict("Poem is already bookmarked"));
        }

        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            poem_id: poem_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        self.db.create("bookmark", &bookmark.id, &bookmark).await?;

        self.poem_service
            .increment_counter(poem_id, "bookmarks_count")
            .await?;

        self.notify_author(&poem, user_id).await;

        Ok(())
    }

    async fn notify_author(&self, poem: &Poem, user_id: &str) {
        let penname = self.user_service.penname_or_default(user_id).await;

        self.notification_service
            .dispatch(NotificationPayload {
                recipient_id: poem.author_id.clone(),
                sender_id: Some(user_id.to_string()),
                kind: NotificationKind::PoemBookmarked,
                entity_id: Some(poem.id.clone()),
                entity_type: EntityKind::Poem,
                message: format!("{}님이 회원님의 시를 북마크했습니다.", penname),
            })
            .await;
    }

    pub async fn remove_bookmark(&self, poem_id: &str, user_id: &str) -> Result<()> {
        if !self.is_bookmarked(poem_id, user_id).await? {
            return Err(AppError::not_found("Bookmark"));
        }

        self.db
            .query_with_params(
                "DELETE bookmark WHERE poem_id = $poem_id AND user_id = $user_id",
                json!({ "poem_id": poem_id, "user_id": user_id }),
            )
            .await?;

        self.poem_service
            .decrement_counter(poem_id, "bookmarks_count")
            .await?;

        Ok(())
    }

    pub async fn get_bookmarks_by_user(&self, user_id: &str) -> Result<Vec<Bookmark>> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM bookmark
                    WHERE user_id = $user_id
                    ORDER BY created_at DESC
                "#,
                json!({ "user_id": user_id }),
            )
            .await?;
        let bookmarks: Vec<Bookmark> = response.take(0)?;
        Ok(bookmarks)
    }

    pub async fn is_bookmarked(&self, poem_id: &str, user_id: &str) -> Result<bool> {
        let count = self
            .db
            .count(
                r#"
                    SELECT count() AS count FROM bookmark
                    WHERE poem_id = $poem_id AND user_id = $user_id
                    GROUP ALL
                "#,
                json!({ "poem_id": poem_id, "user_id": user_id }),
            )
            .await?;
        Ok(count > 0)
    }
}
