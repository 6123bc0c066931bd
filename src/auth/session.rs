use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use super::{claims::SupabaseClaims, token_fingerprint};
use crate::{AppConfig, AppError, AppResult};

/// Identity resolved from an interactive login credential.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Forwarded to the data API so row-level policies see the real caller.
    pub access_token: String,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, access_token: &str) -> AppResult<SessionUser>;
}

/// Verifies Supabase access tokens.
///
/// With a JWT secret configured the signature is checked locally; otherwise
/// the auth API is asked and positive answers are cached briefly.
pub struct SupabaseSessionVerifier {
    http: Client,
    user_url: String,
    anon_key: Option<String>,
    jwt_secret: Option<String>,
    cache: Cache<String, SessionUser>, // token fingerprint → user
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
    email: Option<String>,
}

impl SupabaseSessionVerifier {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(60))
            .max_capacity(10_000)
            .build();

        Ok(Self {
            http,
            user_url: format!("{}/auth/v1/user", config.supabase_url),
            anon_key: config.anon_key.clone(),
            jwt_secret: config.jwt_secret.clone(),
            cache,
        })
    }

    fn verify_locally(&self, access_token: &str, secret: &str) -> AppResult<SessionUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["authenticated"]);
        validation.validate_exp = true;

        let claims = decode::<SupabaseClaims>(
            access_token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Session JWT rejected");
            AppError::Unauthorized("Unauthorized".to_string())
        })?
        .claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))?;

        Ok(SessionUser {
            user_id,
            email: claims.email,
            access_token: access_token.to_string(),
        })
    }

    async fn verify_remotely(&self, access_token: &str) -> AppResult<SessionUser> {
        let key = token_fingerprint(access_token);
        if let Some(user) = self.cache.get(&key).await {
            // Fingerprints are short; make sure the cached entry is really this token.
            if user.access_token == access_token {
                return Ok(user);
            }
        }

        let anon_key = self
            .anon_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("SUPABASE_ANON_KEY not set".to_string()))?;

        let response = self
            .http
            .get(&self.user_url)
            .header("apikey", anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Auth API request failed");
                AppError::Internal("Failed to verify session".to_string())
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Auth API rejected session");
            return Err(AppError::Unauthorized("Unauthorized".to_string()));
        }

        let user: AuthUser = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse auth API response");
            AppError::Internal("Failed to verify session".to_string())
        })?;

        let session = SessionUser {
            user_id: user.id,
            email: user.email,
            access_token: access_token.to_string(),
        };

        self.cache.insert(key, session.clone()).await;
        tracing::debug!(user_id = %session.user_id, "Session cached");

        Ok(session)
    }
}

#[async_trait]
impl SessionVerifier for SupabaseSessionVerifier {
    async fn verify(&self, access_token: &str) -> AppResult<SessionUser> {
        match self.jwt_secret.as_deref() {
            Some(secret) => self.verify_locally(access_token, secret),
            None => self.verify_remotely(access_token).await,
        }
    }
}
