use serde::{Deserialize, Serialize};

/// Claims of a Supabase access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SupabaseClaims {
    pub sub: String,   // auth.users id
    pub exp: i64,
    pub aud: String,   // "authenticated" for signed-in users
    pub email: Option<String>,
    pub role: Option<String>,
}
