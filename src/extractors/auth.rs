use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{self, SessionUser},
    AppError, AppState,
};

/// Cookie carrying the Supabase access token when the browser calls us directly.
const SESSION_COOKIE: &str = "sb-access-token";

fn bearer_from_headers(parts: &Parts) -> Option<String> {
    parts
        .headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Extracts the session credential from the Authorization header, falling back to the cookie
fn session_token_from_request(parts: &Parts) -> Option<String> {
    if let Some(token) = bearer_from_headers(parts) {
        return Some(token);
    }

    let cookie_header = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Caller authenticated with an issued API token.
#[derive(Debug, Clone)]
pub struct BearerUser {
    pub user_id: Uuid,
}

impl FromRequestParts<Arc<AppState>> for BearerUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_from_headers(parts);
        let state = state.clone();

        async move {
            if state.config.service_role_key.is_none() {
                tracing::error!("Bearer request rejected: SUPABASE_SERVICE_ROLE_KEY not set");
                return Err(AppError::Configuration(
                    "SUPABASE_SERVICE_ROLE_KEY not set".to_string(),
                ));
            }

            let token = token.ok_or_else(|| {
                AppError::Unauthorized("Missing or invalid Authorization header".to_string())
            })?;

            let user_id = auth::verify_bearer_token(&state.store, &token).await?;

            Ok(BearerUser { user_id })
        }
    }
}

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = session_token_from_request(parts);
        let state = state.clone();

        async move {
            if state.config.anon_key.is_none() {
                tracing::error!("Session request rejected: SUPABASE_ANON_KEY not set");
                return Err(AppError::Configuration("SUPABASE_ANON_KEY not set".to_string()));
            }

            let token = token.ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

            state.sessions.verify(&token).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_requires_scheme() {
        assert_eq!(bearer_from_headers(&parts(&[("authorization", "Bearer mdt_1")])).as_deref(), Some("mdt_1"));
        assert_eq!(bearer_from_headers(&parts(&[("authorization", "mdt_1")])), None);
        assert_eq!(bearer_from_headers(&parts(&[("authorization", "Basic dXNlcjpwYXNz")])), None);
        assert_eq!(bearer_from_headers(&parts(&[])), None);
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive_but_token_is_verbatim() {
        assert_eq!(bearer_from_headers(&parts(&[("authorization", "bearer mdt_Ab")])).as_deref(), Some("mdt_Ab"));
        assert_eq!(bearer_from_headers(&parts(&[("authorization", "BEARER mdt_Ab")])).as_deref(), Some("mdt_Ab"));
    }

    #[test]
    fn test_session_token_falls_back_to_cookie() {
        let p = parts(&[("cookie", "theme=dark; sb-access-token=jwt-value; other=1")]);
        assert_eq!(session_token_from_request(&p).as_deref(), Some("jwt-value"));

        let p = parts(&[("authorization", "Bearer header-jwt"), ("cookie", "sb-access-token=cookie-jwt")]);
        assert_eq!(session_token_from_request(&p).as_deref(), Some("header-jwt"));

        let p = parts(&[("cookie", "sb-access-token-extra=nope")]);
        assert_eq!(session_token_from_request(&p), None);
    }
}
