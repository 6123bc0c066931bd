use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{DiaryEntry, Mood};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryInputError {
    #[error("Content is required and must be a string")]
    MissingContent,

    #[error("Invalid mood. Must be one of: {}", Mood::valid_list())]
    InvalidMood,
}

/// Validated input for creating a diary entry.
///
/// Built from an untyped JSON body so that every malformed shape (missing
/// field, wrong type, unknown mood) maps to a single validation message.
#[derive(Debug, Clone, PartialEq, ToSchema)]
pub struct CreateDiaryInput {
    /// Entry text, already trimmed and never empty.
    pub content: String,
    pub mood: Option<Mood>,
}

impl CreateDiaryInput {
    pub fn from_json(body: &Value) -> Result<Self, EntryInputError> {
        let content = body
            .get("content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(EntryInputError::MissingContent)?;

        let mood = match body.get("mood") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.parse().map_err(|_| EntryInputError::InvalidMood)?),
            Some(_) => return Err(EntryInputError::InvalidMood),
        };

        Ok(Self {
            content: content.to_string(),
            mood,
        })
    }
}

/// Response for a created diary entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiaryEntryResponse {
    pub success: bool,
    pub data: DiaryEntry,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiaryListResponse {
    pub data: Vec<DiaryEntry>,
}

/// Response for delete operations
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}
