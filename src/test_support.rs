//! Shared fixtures for router-level tests: an in-memory datastore, a fixed
//! session table, and helpers that drive the real router with `oneshot`.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    auth::{SessionUser, SessionVerifier},
    db::memory::MemoryStore,
    startup, AppConfig, AppError, AppResult, AppState, MetricsState,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        supabase_url: "https://example.supabase.co".to_string(),
        service_role_key: Some("service-role-key".to_string()),
        anon_key: Some("anon-key".to_string()),
        jwt_secret: None,
        database_url: None,
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origin: "http://localhost:3000".to_string(),
    }
}

/// Session verifier answering from a fixed token table.
#[derive(Default)]
pub struct StaticSessions {
    users: HashMap<String, Uuid>,
}

#[async_trait]
impl SessionVerifier for StaticSessions {
    async fn verify(&self, access_token: &str) -> AppResult<SessionUser> {
        self.users
            .get(access_token)
            .map(|user_id| SessionUser {
                user_id: *user_id,
                email: None,
                access_token: access_token.to_string(),
            })
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    sessions: StaticSessions,
    config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            sessions: StaticSessions::default(),
            config: test_config(),
        }
    }

    pub fn with_config(mut self, f: impl FnOnce(&mut AppConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Registers a session credential for a fresh user and returns that user's id.
    pub fn sign_in(&mut self, access_token: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        self.sessions.users.insert(access_token.to_string(), user_id);
        user_id
    }

    fn router(&self) -> Router {
        let state = Arc::new(AppState {
            store: self.store.clone(),
            sessions: Arc::new(StaticSessions {
                users: self.sessions.users.clone(),
            }),
            config: self.config.clone(),
            metrics: Arc::new(MetricsState::detached()),
        });
        startup::build_router(state)
    }

    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.router().oneshot(request).await.unwrap()
    }

    /// Sends a request and returns the status with the body parsed as JSON (`Null` if empty or not JSON).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.raw(method, uri, bearer, body).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
