use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::{Database, DatabaseError, DatabaseManager};

/// Shared application state handed to every handler.
///
/// Everything is constructed explicitly from an [`AppConfig`]; there is no
/// ambient global database or configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            db,
            tokens: TokenService::from_config(&config.security),
            passwords: PasswordHasher::new(config.security.bcrypt_cost),
            config: Arc::new(config),
        }
    }

    /// Open and migrate the configured database, then build the state around it
    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::connect_and_migrate(&config.database).await?;
        Ok(Self::new(Database::new(pool), config))
    }
}
