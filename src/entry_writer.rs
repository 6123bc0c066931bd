use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::{Datastore, Scope, StoreError},
    models::{CreateDiaryInput, DiaryEntry, EntryInputError, NewDiaryEntry},
};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Invalid(#[from] EntryInputError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Validate an untyped entry body and persist it for `user_id`.
///
/// Nothing is written unless the content is non-blank and the mood (if any)
/// is one of the fixed tags. Store failures are returned as-is, never retried.
pub async fn write_entry(
    store: &dyn Datastore,
    scope: Scope<'_>,
    user_id: Uuid,
    body: &Value,
) -> Result<DiaryEntry, WriteError> {
    let input = CreateDiaryInput::from_json(body)?;

    let entry = store
        .insert_entry(
            scope,
            &NewDiaryEntry {
                user_id,
                content: input.content,
                mood: input.mood,
            },
        )
        .await?;

    tracing::info!(
        entry_id = %entry.id,
        user_id = %user_id,
        mood = entry.mood.map(|m| m.as_str()).unwrap_or("none"),
        "Diary entry created"
    );

    Ok(entry)
}
