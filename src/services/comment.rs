use crate::{
    error::{AppError, Result},
    models::{
        comment::*,
        notification::{EntityKind, NotificationKind, NotificationPayload},
    },
    services::{Database, NotificationService, PoemService, UserService},
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    poem_service: PoemService,
    user_service: UserService,
    notification_service: NotificationService,
}

impl CommentService {
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

    pub async fn create_comment(
        &self,
        poem_id: &str,
        author_id: &str,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        debug!("Creating comment on poem {} by {}", poem_id, author_id);

        request.validate().map_err(AppError::ValidatorError)?;

        let poem = self
            .poem_service
            .get_poem(poem_id)
            .await?
            .ok_or_else(|| AppError::not_found("Poem"))?;

        let parent = match &request.parent_comment_id {
            Some(parent_id) => {
                let parent = self
                    .get_comment(parent_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Parent comment"))?;
                Some(parent)
            }
            None => None,
        };

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            poem_id: poem_id.to_string(),
            author_id: author_id.to_string(),
            content: request.content,
            parent_comment_id: request.parent_comment_id.clone(),
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.db.create("comment", &comment.id, &comment).await?;

        self.poem_service
            .increment_counter(poem_id, "comments_count")
            .await?;

        // Reply notifies the parent comment's author; a top-level comment
        // notifies the poem's author. Fire-and-forget either way.
        let penname = self.user_service.penname_or_default(author_id).await;
        let payload = match &parent {
            Some(parent) => NotificationPayload {
                recipient_id: parent.author_id.clone(),
                sender_id: Some(author_id.to_string()),
                kind: NotificationKind::NewReply,
                entity_id: Some(comment.id.clone()),
                entity_type: EntityKind::Comment,
                message: format!("{}님이 회원님의 댓글에 답글을 달았습니다.", penname),
            },
            None => NotificationPayload {
                recipient_id: poem.author_id.clone(),
                sender_id: Some(author_id.to_string()),
                kind: NotificationKind::NewComment,
                entity_id: Some(comment.id.clone()),
                entity_type: EntityKind::Comment,
                message: format!("{}님이 회원님의 시에 댓글을 달았습니다.", penname),
            },
        };
        self.notification_service.dispatch(payload).await;

        Ok(comment)
    }

    pub async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>> {
        let comment: Option<Comment> = self.db.get_by_id("comment", comment_id).await?;
        Ok(comment.filter(|c| !c.is_deleted))
    }

    /// Top-level comments for a poem with their replies, each annotated
    /// with the author's penname.
    pub async fn get_comments_by_poem(&self, poem_id: &str) -> Result<Vec<CommentWithAuthor>> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM comment
                    WHERE poem_id = $poem_id
                    AND parent_comment_id = NONE
                    AND is_deleted = false
                    ORDER BY created_at DESC
                "#,
                json!({ "poem_id": poem_id }),
            )
            .await?;
        let top_level: Vec<Comment> = response.take(0)?;

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM comment
                    WHERE poem_id = $poem_id
                    AND parent_comment_id != NONE
                    AND is_deleted = false
                    ORDER BY created_at ASC
                "#,
                json!({ "poem_id": poem_id }),
            )
            .await?;
        let replies: Vec<Comment> = response.take(0)?;

        let author_ids: Vec<String> = top_level
            .iter()
            .chain(replies.iter())
            .map(|c| c.author_id.clone())
            .collect();
        let profiles = self.user_service.get_profiles(&author_ids).await?;
        let penname_of = |author_id: &str| {
            profiles
                .iter()
                .find(|p| p.user_id == author_id)
                .map(|p| p.penname.clone())
                .unwrap_or_else(|| crate::services::user::FALLBACK_PENNAME.to_string())
        };

        let mut result = Vec::with_capacity(top_level.len());
        for comment in top_level {
            let children = replies
                .iter()
                .filter(|r| r.parent_comment_id.as_deref() == Some(comment.id.as_str()))
                .map(|r| CommentWithAuthor {
                    penname: penname_of(&r.author_id),
                    comment: r.clone(),
                    replies: Vec::new(),
                })
                .collect();

            result.push(CommentWithAuthor {
                penname: penname_of(&comment.author_id),
                comment,
                replies: children,
            });
        }

        Ok(result)
    }

    pub async fn update_comment(
        &self,
        comment_id: &str,
        user_id: &str,
        request: UpdateCommentRequest,
    ) -> Result<Comment> {
        request.validate().map_err(AppError::ValidatorError)?;

        let comment = self
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))?;

        if comment.author_id != user_id {
            return Err(AppError::forbidden("You can only edit your own comments"));
        }

        self.db
            .update_merge(
                "comment",
                comment_id,
                json!({ "content": request.content, "updated_at": Utc::now() }),
            )
            .await?;

        self.get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::internal("Failed to reload comment"))
    }

    pub async fn delete_comment(&self, comment_id: &str, user_id: &str) -> Result<()> {
        let comment = self
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))?;

        if comment.author_id != user_id {
            return Err(AppError::forbidden("You can only delete your own comments"));
        }

        self.db
            .update_merge(
                "comment",
                comment_id,
                json!({ "is_deleted": true, "updated_at": Utc::now() }),
            )
            .await?;

        self.poem_service
            .decrement_counter(&comment.poem_id, "comments_count")
            .await?;

        Ok(())
    }
}
