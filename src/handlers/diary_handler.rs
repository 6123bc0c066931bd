use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    auth::SessionUser,
    db::Scope,
    entry_writer::{write_entry, WriteError},
    extractors::BearerUser,
    handlers::{parse_id, parse_json_body},
    models::{CreateDiaryInput, DiaryEntryResponse, DiaryListResponse, Mood, SuccessResponse},
    AppError, AppResult, AppState,
};

impl From<WriteError> for AppError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Invalid(e) => AppError::Validation(e.to_string()),
            WriteError::Persistence(e) => AppError::persistence("Failed to create diary entry", e),
        }
    }
}

/// POST /api/diary/create - Create an entry with an API token
#[utoipa::path(
    post,
    path = "/api/diary/create",
    request_body = CreateDiaryInput,
    responses(
        (status = 200, description = "Diary entry created", body = DiaryEntryResponse),
        (status = 400, description = "Missing content or invalid mood"),
        (status = 401, description = "Missing, malformed or unknown bearer token"),
        (status = 500, description = "Server misconfigured or datastore failure")
    ),
    tag = "diary",
    security(("bearer_token" = []))
)]
pub async fn create_entry_with_token(
    State(state): State<Arc<AppState>>,
    auth: BearerUser,
    body: Bytes,
) -> AppResult<Json<DiaryEntryResponse>> {
    let body = parse_json_body(&body)?;
    let entry = write_entry(state.store.as_ref(), Scope::Service, auth.user_id, &body).await?;

    Ok(Json(DiaryEntryResponse {
        success: true,
        data: entry,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDiaryQuery {
    /// Case-insensitive substring of the entry text
    pub q: Option<String>,
    pub mood: Option<String>,
}

/// GET /api/diary?q=&mood=
#[utoipa::path(
    get,
    path = "/api/diary",
    params(ListDiaryQuery),
    responses(
        (status = 200, description = "Own diary entries, newest first", body = DiaryListResponse),
        (status = 400, description = "Invalid mood filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "diary",
    security(("session" = []))
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Query(query): Query<ListDiaryQuery>,
) -> AppResult<Json<DiaryListResponse>> {
    let mood = match query.mood.as_deref().filter(|m| !m.is_empty()) {
        Some(m) => Some(m.parse::<Mood>().map_err(|_| {
            AppError::Validation(format!("Invalid mood. Must be one of: {}", Mood::valid_list()))
        })?),
        None => None,
    };
    let needle = query.q.unwrap_or_default().trim().to_lowercase();

    let entries = state
        .store
        .list_entries(&user)
        .await
        .map_err(|e| AppError::persistence("Failed to fetch diary entries", e))?
        .into_iter()
        .filter(|e| mood.is_none() || e.mood == mood)
        .filter(|e| e.matches_query(&needle))
        .collect();

    Ok(Json(DiaryListResponse { data: entries }))
}

/// POST /api/diary - Create an entry from the signed-in UI
#[utoipa::path(
    post,
    path = "/api/diary",
    request_body = CreateDiaryInput,
    responses(
        (status = 200, description = "Diary entry created", body = DiaryEntryResponse),
        (status = 400, description = "Missing content or invalid mood"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "diary",
    security(("session" = []))
)]
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    body: Bytes,
) -> AppResult<Json<DiaryEntryResponse>> {
    let body = parse_json_body(&body)?;
    let entry = write_entry(state.store.as_ref(), Scope::User(&user), user.user_id, &body).await?;

    Ok(Json(DiaryEntryResponse {
        success: true,
        data: entry,
    }))
}

/// DELETE /api/diary/{id}
#[utoipa::path(
    delete,
    path = "/api/diary/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Diary entry ID")
    ),
    responses(
        (status = 200, description = "Deleted, or nothing owned by the caller matched", body = SuccessResponse),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "diary",
    security(("session" = []))
)]
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let id = parse_id(&id, "diary entry")?;

    let removed = state
        .store
        .delete_entry(&user, id)
        .await
        .map_err(|e| AppError::persistence("Failed to delete diary entry", e))?;

    if removed == 0 {
        tracing::debug!(entry_id = %id, user_id = %user.user_id, "Delete matched no owned entry");
    }

    Ok(Json(SuccessResponse { success: true }))
}
