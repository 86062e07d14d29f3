use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of notification a user can receive. Unknown kinds fail
/// deserialization, which rejects malformed payloads at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewComment,
    NewReply,
    NewFollower,
    PoemLiked,
    PoemBookmarked,
    SystemAnnouncement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Poem,
    Comment,
    User,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    /// None for system notices.
    pub sender_id: Option<String>,
    pub kind: NotificationKind,
    pub entity_id: Option<String>,
    pub entity_type: EntityKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Producer-side request: everything a notification needs except identity
/// and timestamps. Also the exact wire shape of a queued message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub recipient_id: String,
    pub sender_id: Option<String>,
    pub kind: NotificationKind,
    pub entity_id: Option<String>,
    pub entity_type: EntityKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_notifications: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&NotificationKind::PoemLiked).unwrap();
        assert_eq!(json, r#""poem_liked""#);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result: Result<NotificationKind, _> = serde_json::from_str(r#""poem_exploded""#);
        assert!(result.is_err());
    }

    #[test]
    fn payload_round_trips_with_identical_fields() {
        let payload = NotificationPayload {
            recipient_id: "B".to_string(),
            sender_id: Some("A".to_string()),
            kind: NotificationKind::PoemLiked,
            entity_id: Some("P1".to_string()),
            entity_type: EntityKind::Poem,
            message: "user A liked your poem".to_string(),
        };

        let bytes = serde_json::to_vec(&payload).unwrap();
        let decoded: NotificationPayload = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded.recipient_id, payload.recipient_id);
        assert_eq!(decoded.sender_id, payload.sender_id);
        assert_eq!(decoded.kind, payload.kind);
        assert_eq!(decoded.entity_id, payload.entity_id);
        assert_eq!(decoded.entity_type, payload.entity_type);
        assert_eq!(decoded.message, payload.message);
    }
}
