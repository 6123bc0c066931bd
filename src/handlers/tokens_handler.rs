use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    auth::{generate_api_token, token_fingerprint, SessionUser},
    handlers::{parse_id, parse_json_body},
    models::{CreateTokenInput, NewApiToken, SuccessResponse, TokenCreatedResponse, TokenListResponse},
    AppError, AppResult, AppState,
};

/// GET /api/tokens
#[utoipa::path(
    get,
    path = "/api/tokens",
    responses(
        (status = 200, description = "Own tokens, newest first, secrets omitted", body = TokenListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tokens",
    security(("session" = []))
)]
pub async fn list_tokens(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
) -> AppResult<Json<TokenListResponse>> {
    let tokens = state
        .store
        .list_tokens(&user)
        .await
        .map_err(|e| AppError::persistence("Failed to fetch tokens", e))?;

    Ok(Json(TokenListResponse { data: tokens }))
}

/// POST /api/tokens - Issue a new API token; the only response that carries the secret
#[utoipa::path(
    post,
    path = "/api/tokens",
    request_body = CreateTokenInput,
    responses(
        (status = 200, description = "Token created", body = TokenCreatedResponse),
        (status = 400, description = "Missing name"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tokens",
    security(("session" = []))
)]
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    body: Bytes,
) -> AppResult<Json<TokenCreatedResponse>> {
    let body = parse_json_body(&body)?;
    let input = CreateTokenInput::from_json(&body).map_err(AppError::Validation)?;

    let token = generate_api_token();
    let created = state
        .store
        .insert_token(
            &user,
            &NewApiToken {
                user_id: user.user_id,
                token,
                name: input.name,
            },
        )
        .await
        .map_err(|e| AppError::persistence("Failed to create token", e))?;

    tracing::info!(
        token_id = %created.id,
        user_id = %user.user_id,
        token = %token_fingerprint(&created.token),
        "API token issued"
    );

    Ok(Json(TokenCreatedResponse {
        success: true,
        data: created,
    }))
}

/// DELETE /api/tokens/{id}
#[utoipa::path(
    delete,
    path = "/api/tokens/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Token ID")
    ),
    responses(
        (status = 200, description = "Deleted, or nothing owned by the caller matched", body = SuccessResponse),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tokens",
    security(("session" = []))
)]
pub async fn delete_token(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let id = parse_id(&id, "token")?;

    let removed = state
        .store
        .delete_token(&user, id)
        .await
        .map_err(|e| AppError::persistence("Failed to delete token", e))?;

    if removed == 0 {
        tracing::debug!(token_id = %id, user_id = %user.user_id, "Delete matched no owned token");
    } else {
        tracing::info!(token_id = %id, user_id = %user.user_id, "API token revoked");
    }

    Ok(Json(SuccessResponse { success: true }))
}
