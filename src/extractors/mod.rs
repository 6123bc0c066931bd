pub mod auth;

pub use auth::BearerUser;
