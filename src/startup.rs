use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{handlers, middleware as mw, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    let cors = match state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %state.config.cors_origin, "Ignoring unparseable CORS_ORIGIN");
            cors
        }
    };

    // Diary routes; `/create` is the bearer-token entry point, the rest are session routes
    let diary_routes = Router::new()
        .route("/", get(handlers::diary_handler::list_entries))
        .route("/", post(handlers::diary_handler::create_entry))
        .route("/create", post(handlers::diary_handler::create_entry_with_token))
        .route("/{id}", delete(handlers::diary_handler::delete_entry));

    // Token routes
    let token_routes = Router::new()
        .route("/", get(handlers::tokens_handler::list_tokens))
        .route("/", post(handlers::tokens_handler::create_token))
        .route("/{id}", delete(handlers::tokens_handler::delete_token));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/diary", diary_routes)
        .nest("/api/tokens", token_routes)
        .route("/api/mcp", get(handlers::mcp_handler::describe))
        .route("/api/mcp", post(handlers::mcp_handler::handle_rpc))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route_layer(middleware::from_fn(mw::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(mw::request_id_middleware))
        .layer(cors)
        .with_state(state)
}
