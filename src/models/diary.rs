use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Mood;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub mood: Option<Mood>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// Case-insensitive substring match on the entry text.
    pub fn matches_query(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.content.to_lowercase().contains(needle_lower)
    }
}

/// Insert payload. `mood: None` is written as an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDiaryEntry {
    pub user_id: Uuid,
    pub content: String,
    pub mood: Option<Mood>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_mood_is_serialized_as_null() {
        let entry = NewDiaryEntry {
            user_id: Uuid::nil(),
            content: "x".to_string(),
            mood: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("mood").unwrap().is_null());
    }

    #[test]
    fn test_deserializes_backend_timestamps() {
        let entry: DiaryEntry = serde_json::from_value(serde_json::json!({
            "id": "6f1c1b9e-8a43-4f5e-9d55-2b8f0b8a1d11",
            "user_id": "0b0d3a4e-2f7a-4c43-8b22-5e1f2a7c9d00",
            "content": "walked by the river",
            "mood": "calm",
            "created_at": "2024-05-01T08:30:00.123456+00:00",
            "updated_at": "2024-05-01T08:30:00.123456+00:00"
        }))
        .unwrap();

        assert_eq!(entry.mood, Some(Mood::Calm));
        assert!(entry.matches_query("river"));
        assert!(!entry.matches_query("ocean"));
    }
}
