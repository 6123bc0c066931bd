mod auth;
mod config;
mod db;
mod entry_writer;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod startup;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use auth::{SessionVerifier, SupabaseSessionVerifier};
pub use config::AppConfig;
pub use db::Datastore;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with conditional JSON/text output
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,mindful_diary_api=debug,tower_http=debug".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    if config.service_role_key.is_none() {
        tracing::warn!("SUPABASE_SERVICE_ROLE_KEY not set; bearer-token endpoints will answer 500");
    }
    if config.anon_key.is_none() {
        tracing::warn!("SUPABASE_ANON_KEY not set; session endpoints will answer 500");
    }

    let store: Arc<dyn Datastore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::create_pool(database_url).await.map_err(|e| {
                tracing::error!("Failed to create database pool: {}", e);
                e
            })?;
            tracing::info!("Using direct Postgres datastore");
            Arc::new(db::PgStore::new(pool))
        }
        None => {
            tracing::info!(url = %config.supabase_url, "Using Supabase REST datastore");
            Arc::new(db::PostgrestStore::new(&config)?)
        }
    };

    let sessions = Arc::new(SupabaseSessionVerifier::new(&config)?);
    if config.jwt_secret.is_some() {
        tracing::info!("Session tokens verified locally");
    }

    let metrics = Arc::new(handlers::setup_metrics_recorder()?);
    tracing::info!("Metrics recorder initialized");

    let bind_addr = config.bind_addr.clone();

    let state = Arc::new(AppState {
        store,
        sessions,
        config,
        metrics,
    });

    let app = startup::build_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
