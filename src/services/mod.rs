pub mod analytics;
pub mod auth;
pub mod bookmark;
pub mod comment;
pub mod database;
pub mod follow;
pub mod like;
pub mod notification;
pub mod poem;
pub mod queue;
pub mod tag;
pub mod user;

// Re-export the commonly used types
pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use bookmark::BookmarkService;
pub use comment::CommentService;
pub use database::Database;
pub use follow::FollowService;
pub use like::LikeService;
pub use notification::{NotificationDispatcher, NotificationService};
pub use poem::PoemService;
pub use queue::{QueueTransport, RedisQueue};
pub use tag::TagService;
pub use user::UserService;
