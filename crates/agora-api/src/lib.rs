//! Agora API
//!
//! HTTP surface over the vote / acceptance / reputation core. Wires the
//! SQLite store, the identity resolver, the engines and the notification
//! fan-out into an axum application.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod session;

use agora_engine::{AcceptanceEngine, ContentEngine, VoteLedger};
use agora_identity::IdentityResolver;
use agora_notify::{BroadcastSink, Fanout};
use agora_store::SqliteStore;
use config::ApiConfig;
use handlers::{create_router, AppState};
use session::SessionManager;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::info;

/// API server error
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Store initialization error
    #[error("Store error: {0}")]
    Store(#[from] agora_store::StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared application state from configuration
pub fn build_state(config: &ApiConfig) -> Result<AppState, ApiServerError> {
    let store = SqliteStore::new(&config.database_path)?;
    let sink = BroadcastSink::new(config.realtime_capacity);

    Ok(AppState {
        store: Arc::new(Mutex::new(store)),
        sessions: Arc::new(SessionManager::new(
            &config.jwt_secret,
            config.token_expiry_secs,
        )),
        fanout: Arc::new(Fanout::new(sink)),
        resolver: Arc::new(IdentityResolver::new()),
        votes: Arc::new(VoteLedger::new()),
        acceptance: Arc::new(AcceptanceEngine::new()),
        content: Arc::new(ContentEngine::new()),
    })
}

/// Start the API HTTP server
///
/// Initializes logging, opens the store, and serves the axum application.
pub async fn start_server(config: ApiConfig) -> Result<(), ApiServerError> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Agora API");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Token expiry: {} seconds", config.token_expiry_secs);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("API listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ApiServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_from_test_config() {
        let config = ApiConfig::default_test_config();
        let state = build_state(&config).unwrap();
        assert!(state.store.lock().is_ok());
    }
}
