use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        analytics::AnalyticsService, auth::AuthService, bookmark::BookmarkService,
        comment::CommentService, database::Database, follow::FollowService, like::LikeService,
        notification::NotificationService, poem::PoemService, tag::TagService, user::UserService,
    },
};

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub db: Arc<Database>,

    pub auth_service: AuthService,

    pub user_service: UserService,

    pub poem_service: PoemService,

    pub comment_service: CommentService,

    pub like_service: LikeService,

    pub bookmark_service: BookmarkService,

    pub follow_service: FollowService,

    pub tag_service: TagService,

    pub notification_service: NotificationService,

    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }

    pub fn is_development(&self) -> bool {
        self.config.is_development()
    }
}
