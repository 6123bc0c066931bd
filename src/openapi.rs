use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mindful Diary API",
        version = "1.0.0",
        description = "Diary entries, API tokens and a JSON-RPC tool endpoint for agents"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Diary
        crate::handlers::diary_handler::create_entry_with_token,
        crate::handlers::diary_handler::list_entries,
        crate::handlers::diary_handler::create_entry,
        crate::handlers::diary_handler::delete_entry,

        // Tool dispatch
        crate::handlers::mcp_handler::describe,
        crate::handlers::mcp_handler::handle_rpc,

        // Tokens
        crate::handlers::tokens_handler::list_tokens,
        crate::handlers::tokens_handler::create_token,
        crate::handlers::tokens_handler::delete_token,
    ),
    components(
        schemas(
            crate::models::DiaryEntry,
            crate::models::Mood,
            crate::models::ApiToken,
            crate::models::ApiTokenSummary,
            crate::models::CreateDiaryInput,
            crate::models::CreateTokenInput,
            crate::models::DiaryEntryResponse,
            crate::models::DiaryListResponse,
            crate::models::TokenCreatedResponse,
            crate::models::TokenListResponse,
            crate::models::SuccessResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "diary", description = "Diary entries"),
        (name = "mcp", description = "JSON-RPC tool dispatch for agents"),
        (name = "tokens", description = "API token lifecycle"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("sb-access-token"))),
            );
        }
    }
}
