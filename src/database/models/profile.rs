use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::database::{Database, DatabaseError, Entity};

/// Public identity. Articles and comments are authored by a profile, not a user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Profile {
    const TABLE: &'static str = "profiles";
}

impl Profile {
    pub async fn find_by_name(db: &Database, name: &str) -> Result<Option<Profile>, DatabaseError> {
        db.profiles().find_by("name", name.to_string()).await
    }
}
