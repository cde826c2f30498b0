use tracing::info;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect_and_migrate(&config.database).await?;
    pool.close().await;
    info!("Migrations applied to {}", config.database.url);
    Ok(())
}
