use crate::config::AppConfig;
use crate::database::models::{Account, NewUser, User};
use crate::database::{Database, DatabaseManager};

/// Fresh, migrated in-memory database private to the calling test
pub async fn memory_database() -> Database {
    let config = AppConfig::testing();
    let pool = DatabaseManager::connect_and_migrate(&config.database)
        .await
        .expect("failed to open in-memory database");
    Database::new(pool)
}

/// Register `username` with a placeholder hash and `<username>@example.com`
pub async fn seed_account(db: &Database, username: &str) -> Account {
    User::create_with_profile(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .expect("failed to seed account")
}
