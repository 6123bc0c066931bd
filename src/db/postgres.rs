use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{Datastore, Scope, StoreError, StoreResult};
use crate::auth::SessionUser;
use crate::models::{ApiToken, ApiTokenSummary, DiaryEntry, NewApiToken, NewDiaryEntry, TokenOwner};

/// Datastore talking to the backend's Postgres database directly.
///
/// The connection bypasses row-level security, so ownership is enforced by
/// the `user_id` predicates below.
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// `mood` is plain text in the table.
#[derive(FromRow)]
struct DiaryEntryRow {
    id: Uuid,
    user_id: Uuid,
    content: String,
    mood: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DiaryEntryRow> for DiaryEntry {
    type Error = StoreError;

    fn try_from(row: DiaryEntryRow) -> Result<Self, Self::Error> {
        let mood = row
            .mood
            .map(|m| m.parse())
            .transpose()
            .map_err(|e| StoreError::Decode(format!("diary entry {}: {}", row.id, e)))?;

        Ok(DiaryEntry {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            mood,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl Datastore for PgStore {
    async fn find_token(&self, token: &str) -> StoreResult<Option<TokenOwner>> {
        let owner = sqlx::query_as::<_, TokenOwner>(
            r#"SELECT user_id, token FROM api_tokens WHERE token = $1 LIMIT 1"#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;

        Ok(owner)
    }

    async fn touch_token(&self, token: &str, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query(r#"UPDATE api_tokens SET last_used_at = $2 WHERE token = $1"#)
            .bind(token)
            .bind(at)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn insert_entry(&self, _scope: Scope<'_>, entry: &NewDiaryEntry) -> StoreResult<DiaryEntry> {
        let row = sqlx::query_as::<_, DiaryEntryRow>(
            r#"
            INSERT INTO diary_entries (user_id, content, mood)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content, mood, created_at, updated_at
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.content)
        .bind(entry.mood.map(|m| m.as_str()))
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn list_entries(&self, user: &SessionUser) -> StoreResult<Vec<DiaryEntry>> {
        sqlx::query_as::<_, DiaryEntryRow>(
            r#"
            SELECT id, user_id, content, mood, created_at, updated_at
            FROM diary_entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user.user_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(DiaryEntry::try_from)
        .collect()
    }

    async fn delete_entry(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(r#"DELETE FROM diary_entries WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user.user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_tokens(&self, user: &SessionUser) -> StoreResult<Vec<ApiTokenSummary>> {
        let tokens = sqlx::query_as::<_, ApiTokenSummary>(
            r#"
            SELECT id, name, created_at, last_used_at
            FROM api_tokens
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user.user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tokens)
    }

    async fn insert_token(&self, user: &SessionUser, token: &NewApiToken) -> StoreResult<ApiToken> {
        let created = sqlx::query_as::<_, ApiToken>(
            r#"
            INSERT INTO api_tokens (user_id, token, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token, name, created_at, last_used_at
            "#,
        )
        .bind(user.user_id)
        .bind(&token.token)
        .bind(&token.name)
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    async fn delete_token(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(r#"DELETE FROM api_tokens WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user.user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
