pub mod diary_handler;
pub mod health;
pub mod mcp_handler;
pub mod metrics;
pub mod tokens_handler;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};

use serde_json::Value;
use uuid::Uuid;

use crate::{AppError, AppResult};

/// Parse a request body as untyped JSON; shape validation happens afterwards.
pub(crate) fn parse_json_body(body: &[u8]) -> AppResult<Value> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        AppError::BadRequest("Request body must be valid JSON".to_string())
    })
}

pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} id: {}", what, raw)))
}
