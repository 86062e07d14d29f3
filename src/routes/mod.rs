pub mod analytics;
pub mod bookmarks;
pub mod comments;
pub mod follows;
pub mod likes;
pub mod notifications;
pub mod poems;
pub mod tags;
pub mod users;
