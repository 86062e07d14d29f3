use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Join record between a poem and the user who bookmarked it. At most one
/// per (poem, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub poem_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkStatus {
    pub is_bookmarked: bool,
}
