use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{db::Datastore, AppError, AppResult};

/// Marks issued API tokens so they are recognizable at a glance.
pub const TOKEN_PREFIX: &str = "mdt_";

/// Generate a new API token: prefix + 32 bytes of OS randomness as hex.
pub fn generate_api_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    format!("{}{}", TOKEN_PREFIX, hex::encode(bytes))
}

/// Short, non-reversible label for a token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

/// Resolve a bearer token to the user that owns it.
///
/// On success the token's `last_used_at` is refreshed on a detached task;
/// a failure there is logged and otherwise ignored.
pub async fn verify_bearer_token(store: &Arc<dyn Datastore>, token: &str) -> AppResult<Uuid> {
    let fingerprint = token_fingerprint(token);

    let owner = store
        .find_token(token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, token = %fingerprint, "Token lookup failed");
            AppError::Unauthorized("Invalid token".to_string())
        })?
        // The backend filter already matched; compare again so only an exact match counts.
        .filter(|owner| bool::from(owner.token.as_bytes().ct_eq(token.as_bytes())))
        .ok_or_else(|| {
            tracing::debug!(token = %fingerprint, "Unknown bearer token");
            AppError::Unauthorized("Invalid token".to_string())
        })?;

    let store = Arc::clone(store);
    let token = token.to_string();
    tokio::spawn(async move {
        if let Err(e) = store.touch_token(&token, Utc::now()).await {
            tracing::warn!(error = %e, token = %token_fingerprint(&token), "Failed to update last_used_at");
        }
    });

    tracing::debug!(user_id = %owner.user_id, token = %fingerprint, "Bearer token verified");
    Ok(owner.user_id)
}
