use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub supabase_url: String,
    /// Privileged key for the bearer-token write paths. Checked per request.
    pub service_role_key: Option<String>,
    /// Public key for the session-authenticated paths. Checked per request.
    pub anon_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let supabase_url = first_var(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"])
            .ok_or_else(|| "SUPABASE_URL must be set".to_string())?;

        let supabase_url = normalize_base_url(&supabase_url)?;

        Ok(Self {
            supabase_url,
            service_role_key: first_var(&["SUPABASE_SERVICE_ROLE_KEY"]),
            anon_key: first_var(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]),
            jwt_secret: first_var(&["SUPABASE_JWT_SECRET"]),
            database_url: first_var(&["DATABASE_URL"]),
            bind_addr: first_var(&["BIND_ADDR"]).unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            cors_origin: first_var(&["CORS_ORIGIN"])
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        })
    }
}

/// Returns the first of `names` that is set to a non-blank value.
fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn normalize_base_url(raw: &str) -> Result<String, String> {
    if !(raw.starts_with("https://") || raw.starts_with("http://")) {
        return Err(format!("SUPABASE_URL must be an http(s) URL, got {}", raw));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
