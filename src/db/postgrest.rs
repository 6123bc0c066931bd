use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use super::{Datastore, Scope, StoreError, StoreResult};
use crate::auth::SessionUser;
use crate::models::{ApiToken, ApiTokenSummary, DiaryEntry, NewApiToken, NewDiaryEntry, TokenOwner};
use crate::AppConfig;

const ENTRIES: &str = "diary_entries";
const TOKENS: &str = "api_tokens";
const ENTRY_COLUMNS: &str = "id,user_id,content,mood,created_at,updated_at";
const TOKEN_SUMMARY_COLUMNS: &str = "id,name,created_at,last_used_at";

/// Datastore backed by the Supabase REST data API.
pub struct PostgrestStore {
    http: Client,
    rest_url: String,
    service_key: Option<String>,
    anon_key: Option<String>,
}

impl PostgrestStore {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", config.supabase_url),
            service_key: config.service_role_key.clone(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn request(&self, method: Method, table: &str, scope: Scope<'_>) -> StoreResult<RequestBuilder> {
        let url = format!("{}/{}", self.rest_url, table);

        let (api_key, bearer) = match scope {
            Scope::Service => {
                let key = self.service_key.as_deref().ok_or_else(|| {
                    StoreError::Configuration("SUPABASE_SERVICE_ROLE_KEY not set".to_string())
                })?;
                (key, key)
            }
            Scope::User(user) => {
                let key = self.anon_key.as_deref().ok_or_else(|| {
                    StoreError::Configuration("SUPABASE_ANON_KEY not set".to_string())
                })?;
                (key, user.access_token.as_str())
            }
        };

        Ok(self
            .http
            .request(method, url)
            .header("apikey", api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer)))
    }
}

/// `eq.` filter value for a PostgREST query parameter.
fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status));

    tracing::debug!(status = %status, body, "Datastore rejected request");

    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let response = check(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Inserts and deletes ask for `return=representation`, which yields an array.
async fn read_single<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    read_json::<Vec<T>>(response)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty representation".to_string()))
}

#[async_trait]
impl Datastore for PostgrestStore {
    async fn find_token(&self, token: &str) -> StoreResult<Option<TokenOwner>> {
        let response = self
            .request(Method::GET, TOKENS, Scope::Service)?
            .query(&[("select", "user_id,token"), ("limit", "1")])
            .query(&[("token", eq(token))])
            .send()
            .await?;

        let rows: Vec<TokenOwner> = read_json(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn touch_token(&self, token: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let response = self
            .request(Method::PATCH, TOKENS, Scope::Service)?
            .query(&[("token", eq(token))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "last_used_at": at }))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn insert_entry(&self, scope: Scope<'_>, entry: &NewDiaryEntry) -> StoreResult<DiaryEntry> {
        let response = self
            .request(Method::POST, ENTRIES, scope)?
            .query(&[("select", ENTRY_COLUMNS)])
            .header("Prefer", "return=representation")
            .json(&[entry])
            .send()
            .await?;

        read_single(response).await
    }

    async fn list_entries(&self, user: &SessionUser) -> StoreResult<Vec<DiaryEntry>> {
        let response = self
            .request(Method::GET, ENTRIES, Scope::User(user))?
            .query(&[("select", ENTRY_COLUMNS), ("order", "created_at.desc")])
            .query(&[("user_id", eq(user.user_id))])
            .send()
            .await?;

        read_json(response).await
    }

    async fn delete_entry(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64> {
        let response = self
            .request(Method::DELETE, ENTRIES, Scope::User(user))?
            .query(&[("select", "id")])
            .query(&[("id", eq(id)), ("user_id", eq(user.user_id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let removed: Vec<Value> = read_json(response).await?;
        Ok(removed.len() as u64)
    }

    async fn list_tokens(&self, user: &SessionUser) -> StoreResult<Vec<ApiTokenSummary>> {
        let response = self
            .request(Method::GET, TOKENS, Scope::User(user))?
            .query(&[("select", TOKEN_SUMMARY_COLUMNS), ("order", "created_at.desc")])
            .query(&[("user_id", eq(user.user_id))])
            .send()
            .await?;

        read_json(response).await
    }

    async fn insert_token(&self, user: &SessionUser, token: &NewApiToken) -> StoreResult<ApiToken> {
        let response = self
            .request(Method::POST, TOKENS, Scope::User(user))?
            .header("Prefer", "return=representation")
            .json(&[token])
            .send()
            .await?;

        read_single(response).await
    }

    async fn delete_token(&self, user: &SessionUser, id: Uuid) -> StoreResult<u64> {
        let response = self
            .request(Method::DELETE, TOKENS, Scope::User(user))?
            .query(&[("select", "id")])
            .query(&[("id", eq(id)), ("user_id", eq(user.user_id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let removed: Vec<Value> = read_json(response).await?;
        Ok(removed.len() as u64)
    }
}
