//! In-process datastore used by the handler tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::{Datastore, Scope, StoreError, StoreResult};
use crate::auth::SessionUser;
use crate::models::{ApiToken, ApiTokenSummary, DiaryEntry, NewApiToken, NewDiaryEntry, TokenOwner};

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<DiaryEntry>>,
    tokens: Mutex<Vec<ApiToken>>,
    fail_writes: AtomicBool,
    fail_touches: AtomicBool,
    touch_attempts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every insert fail as if the backend were down.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every `last_used_at` update fail.
    pub fn fail_touches(&self, fail: bool) {
        self.fail_touches.store(fail, Ordering::SeqCst);
    }

    pub fn touch_attempts(&self) -> usize {
        self.touch_attempts.load(Ordering::SeqCst)
    }

    /// Seeds a token for `user_id` and returns its record.
    pub fn seed_token(&self, user_id: Uuid, token: &str, name: &str) -> ApiToken {
        let record = ApiToken {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.tokens.lock().unwrap().push(record.clone());
        record
    }

    pub fn entries(&self) -> Vec<DiaryEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<ApiToken> {
        self.tokens.lock().unwrap().clone()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn find_token(&self, token: &str) -> StoreResult<Option<TokenOwner>> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token == token)
            .map(|t| TokenOwner {
                user_id: t.user_id,
                token: t.token.clone(),
            }))
    }

    async fn touch_token(&self, token: &str, at: DateTime<Utc>) -> StoreResult<()> {
        self.touch_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_touches.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        for t in self.tokens.lock().unwrap().iter_mut().filter(|t| t.token == token) {
            t.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn insert_entry(&self, _scope: Scope<'_>, entry: &NewDiaryEntry) -> StoreResult<DiaryEntry> {
        self.check_writable()?;
        let now = Utc::now();
        let stored = DiaryEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            content: entry.content.clone(),
            mood: entry.mood,
            created_at: now,
            updated_at: now,
        };
        self.entries.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_entries(&self, user: &SessionUser) -> StoreResult<Vec<DiaryEntry>> {
        let mut own: Vec<DiaryEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user.user_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own)
    }

    async fn delete_entry(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| !(e.id == id && e.user_id == user.user_id));
        Ok((before - entries.len()) as u64)
    }

    async fn list_tokens(&self, user: &SessionUser) -> StoreResult<Vec<ApiTokenSummary>> {
        let mut own: Vec<ApiTokenSummary> = self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user.user_id)
            .map(ApiTokenSummary::from)
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own)
    }

    async fn insert_token(&self, user: &SessionUser, token: &NewApiToken) -> StoreResult<ApiToken> {
        self.check_writable()?;
        let record = ApiToken {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            token: token.token.clone(),
            name: token.name.clone(),
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.tokens.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete_token(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| !(t.id == id && t.user_id == user.user_id));
        Ok((before - tokens.len()) as u64)
    }
}
