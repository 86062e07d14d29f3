use crate::{
    error::{AppError, Result},
    models::{
        follow::*,
        notification::{EntityKind, NotificationKind, NotificationPayload},
        user::UserProfile,
    },
    services::{Database, NotificationService, UserService},
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct FollowService {
    db: Arc<Database>,
    user_service: UserService,
    notification_service: NotificationService,
}

impl FollowService {
    pub async fn new(
        db: Arc<Database>,
        user_service: UserService,
        notification_service: NotificationService,
    ) -> Result<Self> {
        Ok(Self {
            db,
            user_service,
            notification_service,
        })
    }

    pub async fn follow(&self, follower_id: &str, following_id: &str) -> Result<()> {
        debug!("User {} following {}", follower_id, following_id);

        if follower_id == following_id {
            return Err(AppError::bad_request("You cannot follow yourself"));
        }

        self.user_service
            .get_profile(following_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if self.is_following(follower_id, following_id).await? {
            return Err(AppError::conflict("Already following this user"));
        }

        let follow = Follow {
            id: Uuid::new_v4().to_string(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: Utc::now(),
        };
        self.db.create("follow", &follow.id, &follow).await?;

        let penname = self.user_service.penname_or_default(follower_id).await;
        self.notification_service
            .dispatch(NotificationPayload {
                recipient_id: following_id.to_string(),
                sender_id: Some(follower_id.to_string()),
                kind: NotificationKind::NewFollower,
                entity_id: Some(follower_id.to_string()),
                entity_type: EntityKind::User,
                message: format!("{}님이 회원님을 팔로우합니다.", penname),
            })
            .await;

        Ok(())
    }

    pub async fn unfollow(&self, follower_id: &str, following_id: &str) -> Result<()> {
        if !self.is_following(follower_id, following_id).await? {
            return Err(AppError::not_found("Follow"));
        }

        self.db
            .query_with_params(
                "DELETE follow WHERE follower_id = $follower_id AND following_id = $following_id",
                json!({ "follower_id": follower_id, "following_id": following_id }),
            )
            .await?;

        Ok(())
    }

    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let count = self
            .db
            .count(
                r#"
                    SELECT count() AS count FROM follow
                    WHERE follower_id = $follower_id AND following_id = $following_id
                    GROUP ALL
                "#,
                json!({ "follower_id": follower_id, "following_id": following_id }),
            )
            .await?;
        Ok(count > 0)
    }

    /// Profiles of everyone who follows the given user.
    pub async fn get_followers(&self, user_id: &str) -> Result<Vec<UserProfile>> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM follow
                    WHERE following_id = $user_id
                    ORDER BY created_at DESC
                "#,
                json!({ "user_id": user_id }),
            )
            .await?;
        let follows: Vec<Follow> = response.take(0)?;

        let ids: Vec<String> = follows.into_iter().map(|f| f.follower_id).collect();
        self.user_service.get_profiles(&ids).await
    }

    pub async fn get_following(&self, user_id: &str) -> Result<Vec<UserProfile>> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT *, meta::id(id) AS id FROM follow
                    WHERE follower_id = $user_id
                    ORDER BY created_at DESC
                "#,
                json!({ "user_id": user_id }),
            )
            .await?;
        let follows: Vec<Follow> = response.take(0)?;

        let ids: Vec<String> = follows.into_iter().map(|f| f.following_id).collect();
        self.user_service.get_profiles(&ids).await
    }

    pub async fn get_stats(&self, user_id: &str) -> Result<FollowStats> {
        let followers = self
            .db
            .count(
                "SELECT count() AS count FROM follow WHERE following_id = $user_id GROUP ALL",
                json!({ "user_id": user_id }),
            )
            .await?;
        let following = self
            .db
            .count(
                "SELECT count() AS count FROM follow WHERE follower_id = $user_id GROUP ALL",
                json!({ "user_id": user_id }),
            )
            .await?;

        Ok(FollowStats {
            followers,
            following,
        })
    }
}
