use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poem {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    /// Penname of the author at the moment of writing, kept as a static
    /// record even if the profile is renamed later.
    pub penname_at_creation: String,
    /// Raw tag values: either the id of a custom emotion tag or a literal
    /// built-in tag name. Normalized only at the analytics boundary.
    pub emotion_tags: Vec<String>,
    pub is_public: bool,
    pub likes_count: i64,
    pub bookmarks_count: i64,
    pub comments_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePoemRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    #[serde(default)]
    pub emotion_tags: Vec<String>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePoemRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub content: Option<String>,
    pub emotion_tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

fn default_is_public() -> bool {
    true
}
