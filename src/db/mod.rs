use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::models::{ApiToken, ApiTokenSummary, DiaryEntry, NewApiToken, NewDiaryEntry, TokenOwner};

#[cfg(test)]
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod postgrest;

pub use pool::create_pool;
pub use postgres::PgStore;
pub use postgrest::PostgrestStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Configuration(String),

    #[error("datastore request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected datastore response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which credential a write runs under.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Privileged key; row-level security is bypassed, so callers pass the owner explicitly.
    Service,
    /// The signed-in user's own credential.
    User(&'a SessionUser),
}

/// Remote tables `diary_entries` and `api_tokens`.
///
/// Every session-scoped call filters by the caller's `user_id` in addition to
/// whatever row-level policy the backend applies.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn find_token(&self, token: &str) -> StoreResult<Option<TokenOwner>>;

    async fn touch_token(&self, token: &str, at: DateTime<Utc>) -> StoreResult<()>;

    async fn insert_entry(&self, scope: Scope<'_>, entry: &NewDiaryEntry) -> StoreResult<DiaryEntry>;

    /// Newest first.
    async fn list_entries(&self, user: &SessionUser) -> StoreResult<Vec<DiaryEntry>>;

    /// Returns the number of rows removed.
    async fn delete_entry(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64>;

    /// Newest first, without the secret.
    async fn list_tokens(&self, user: &SessionUser) -> StoreResult<Vec<ApiTokenSummary>>;

    async fn insert_token(&self, user: &SessionUser, token: &NewApiToken) -> StoreResult<ApiToken>;

    /// Returns the number of rows removed.
    async fn delete_token(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64>;
}
