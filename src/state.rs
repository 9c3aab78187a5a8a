use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::jwt::JwtManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Application configuration
    pub config: Arc<Config>,
    /// Token issuer/verifier built from `config.jwt`
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let jwt = JwtManager::from_config(&config.jwt);
        Self {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
        }
    }
}
