use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An emotion tag as the client sees it: a display name and a hex color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionTag {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// A user-created emotion tag persisted in the `emotion_tag` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomEmotionTag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEmotionTagRequest {
    #[validate(length(min = 1, max = 20))]
    pub name: String,
}

pub const DEFAULT_TAG_COLOR: &str = "#808080";

/// The fixed built-in emotion catalog. Ids are stable slugs; names are the
/// Korean display names the mobile client renders.
pub const BUILTIN_EMOTION_TAGS: &[(&str, &str, &str)] = &[
    ("joy", "기쁨", "#FFD700"),
    ("happy", "행복", "#FFA500"),
    ("love", "사랑", "#FF69B4"),
    ("flutter", "설렘", "#FF1493"),
    ("peace", "평온", "#87CEEB"),
    ("gratitude", "감사", "#32CD32"),
    ("hope", "희망", "#00BFFF"),
    ("sad", "슬픔", "#4682B4"),
    ("miss", "그리움", "#9370DB"),
    ("lonely", "외로움", "#6A5ACD"),
    ("depressed", "우울", "#483D8B"),
    ("anxiety", "불안", "#2F4F4F"),
    ("anger", "분노", "#B22222"),
    ("regret", "후회", "#A52A2A"),
    ("despair", "절망", "#800000"),
    ("empty", "공허", "#696969"),
];

/// Look up a built-in tag by display name.
pub fn builtin_by_name(name: &str) -> Option<EmotionTag> {
    BUILTIN_EMOTION_TAGS
        .iter()
        .find(|(_, n, _)| *n == name)
        .map(|(id, n, color)| EmotionTag {
            id: (*id).to_string(),
            name: (*n).to_string(),
            color: (*color).to_string(),
        })
}

/// Look up a built-in tag by slug id or display name. Poem tags written by
/// older clients carry the slug, newer ones the display name.
pub fn resolve_builtin(value: &str) -> Option<EmotionTag> {
    BUILTIN_EMOTION_TAGS
        .iter()
        .find(|(id, n, _)| *id == value || *n == value)
        .map(|(id, n, color)| EmotionTag {
            id: (*id).to_string(),
            name: (*n).to_string(),
            color: (*color).to_string(),
        })
}

pub fn builtin_tags() -> Vec<EmotionTag> {
    BUILTIN_EMOTION_TAGS
        .iter()
        .map(|(id, name, color)| EmotionTag {
            id: (*id).to_string(),
            name: (*name).to_string(),
            color: (*color).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_catalog_has_sixteen_distinct_entries() {
        assert_eq!(BUILTIN_EMOTION_TAGS.len(), 16);

        let names: HashSet<_> = BUILTIN_EMOTION_TAGS.iter().map(|(_, n, _)| *n).collect();
        let colors: HashSet<_> = BUILTIN_EMOTION_TAGS.iter().map(|(_, _, c)| *c).collect();
        assert_eq!(names.len(), 16);
        assert_eq!(colors.len(), 16);
    }

    #[test]
    fn builtin_by_name_resolves_display_name() {
        let tag = builtin_by_name("기쁨").unwrap();
        assert_eq!(tag.id, "joy");
        assert_eq!(tag.color, "#FFD700");

        assert!(builtin_by_name("no-such-emotion").is_none());
    }
}
