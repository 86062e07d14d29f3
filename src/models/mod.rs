pub mod bookmark;
pub mod comment;
pub mod follow;
pub mod like;
pub mod notification;
pub mod poem;
pub mod tag;
pub mod user;
