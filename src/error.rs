use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Logs the datastore failure and hides its detail behind `context`.
    /// A missing credential inside the store still surfaces as a configuration error.
    pub fn persistence(context: &str, err: StoreError) -> Self {
        match err {
            StoreError::Configuration(msg) => AppError::Configuration(msg),
            other => {
                tracing::error!(error = %other, "{}", context);
                AppError::Persistence(context.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Configuration(msg) => format!("Server configuration error: {}", msg),
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Validation(msg)
            | AppError::Persistence(msg)
            | AppError::Internal(msg) => msg,
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
