//! Tool-calling endpoint speaking a minimal JSON-RPC 2.0 dialect.
//!
//! Authentication failures are answered with the plain `{error}` body used by
//! the REST endpoints, before any envelope is parsed. Everything after that
//! is answered inside the envelope with HTTP 200, except an unreadable body,
//! which is a 500 with `id: null`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::Scope,
    entry_writer::{write_entry, WriteError},
    extractors::BearerUser,
    models::{
        rpc::{INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND},
        DiaryEntry, Mood, RpcCall, RpcError, RpcResponse,
    },
    AppState,
};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "mindful-diary";
pub const CREATE_ENTRY_TOOL: &str = "create_diary_entry";

static TOOL_CATALOG: Lazy<Value> = Lazy::new(|| {
    let moods: Vec<&str> = Mood::ALL.iter().map(|m| m.as_str()).collect();
    json!({
        "tools": [
            {
                "name": CREATE_ENTRY_TOOL,
                "description": "Create a new diary entry. Use this to record thoughts, feelings, or experiences.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "content": {
                            "type": "string",
                            "description": "The diary entry content. Can be plain text or markdown."
                        },
                        "mood": {
                            "type": "string",
                            "enum": moods,
                            "description": "Optional mood indicator for the entry"
                        }
                    },
                    "required": ["content"]
                }
            }
        ]
    })
});

/// GET /api/mcp - Discovery document
#[utoipa::path(
    get,
    path = "/api/mcp",
    responses(
        (status = 200, description = "Static server description", body = Object)
    ),
    tag = "mcp"
)]
pub async fn describe() -> Json<Value> {
    Json(json!({
        "name": "Mindful Diary MCP Server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "MCP server for creating diary entries",
        "tools": [CREATE_ENTRY_TOOL],
        "transport": "http",
        "endpoint": "/api/mcp"
    }))
}

/// POST /api/mcp - JSON-RPC 2.0 tool dispatch
#[utoipa::path(
    post,
    path = "/api/mcp",
    request_body(content = Object, description = "JSON-RPC 2.0 request"),
    responses(
        (status = 200, description = "JSON-RPC response carrying a result or an error", body = Object),
        (status = 401, description = "Missing, malformed or unknown bearer token"),
        (status = 500, description = "Server misconfigured or unreadable request")
    ),
    tag = "mcp",
    security(("bearer_token" = []))
)]
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    auth: BearerUser,
    body: Bytes,
) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable JSON-RPC body");
            let envelope = RpcResponse::failure(Value::Null, RpcError::new(INTERNAL_ERROR, "Internal error"));
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response();
        }
    };

    let response = dispatch(&state, auth.user_id, RpcCall::from_json(&body)).await;

    Json(response).into_response()
}

async fn dispatch(state: &AppState, user_id: Uuid, call: RpcCall) -> RpcResponse {
    if call.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
        return RpcResponse::failure(call.id, RpcError::new(INVALID_REQUEST, "Invalid Request"));
    }

    let method = call.method.as_deref().unwrap_or("null");
    tracing::debug!(method, user_id = %user_id, "JSON-RPC call");

    match method {
        "initialize" => RpcResponse::success(
            call.id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {}
                }
            }),
        ),
        "tools/list" => RpcResponse::success(call.id, TOOL_CATALOG.clone()),
        "tools/call" => match call_tool(state, user_id, &call.params).await {
            Ok(result) => RpcResponse::success(call.id, result),
            Err(error) => RpcResponse::failure(call.id, error),
        },
        other => RpcResponse::failure(
            call.id,
            RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {}", other)),
        ),
    }
}

async fn call_tool(state: &AppState, user_id: Uuid, params: &Value) -> Result<Value, RpcError> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::new(INVALID_PARAMS, "Invalid params: tool name is required"))?;

    if name != CREATE_ENTRY_TOOL {
        return Err(RpcError::new(METHOD_NOT_FOUND, format!("Unknown tool: {}", name)));
    }

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    let entry = write_entry(state.store.as_ref(), Scope::Service, user_id, &arguments)
        .await
        .map_err(|err| match err {
            WriteError::Invalid(e) => RpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)),
            WriteError::Persistence(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Error creating diary entry");
                RpcError::new(INTERNAL_ERROR, format!("Error creating diary entry: {}", e))
            }
        })?;

    Ok(json!({
        "content": [
            {
                "type": "text",
                "text": confirmation_text(&entry)
            }
        ]
    }))
}

fn confirmation_text(entry: &DiaryEntry) -> String {
    let mood = entry
        .mood
        .map(|m| format!("{} {}", m, m.emoji()))
        .unwrap_or_else(|| "none".to_string());

    format!(
        "Diary entry created successfully!\n\nID: {}\nCreated at: {}\nMood: {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        mood
    )
}
