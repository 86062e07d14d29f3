use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Join record between a poem and the user who liked it. At most one per
/// (poem, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub poem_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeStatus {
    pub is_liked: bool,
}
