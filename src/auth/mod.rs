pub mod bearer;
pub mod claims;
pub mod session;

pub use bearer::{generate_api_token, token_fingerprint, verify_bearer_token, TOKEN_PREFIX};
pub use session::{SessionUser, SessionVerifier, SupabaseSessionVerifier};
