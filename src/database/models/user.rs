use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::Profile;
use crate::database::{Database, DatabaseError, Entity};

/// Image given to every newly registered profile
pub const DEFAULT_IMAGE: &str = "https://static.productionready.io/images/smiley-cyrus.jpg";

/// Private account record. Owns exactly one profile.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub hash: String,
    pub profile_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const TABLE: &'static str = "users";
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hash: String,
}

/// A user together with its profile, as resolved for an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user: User,
    pub profile: Profile,
}

/// Partial account update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub email: Option<String>,
    pub hash: Option<String>,
}

impl AccountChanges {
    fn touches_profile(&self) -> bool {
        self.username.is_some() || self.bio.is_some() || self.image.is_some()
    }

    fn touches_user(&self) -> bool {
        self.email.is_some() || self.hash.is_some()
    }
}

impl User {
    /// Insert the profile and the user that owns it in one transaction
    pub async fn create_with_profile(db: &Database, new: NewUser) -> Result<Account, DatabaseError> {
        let now = Utc::now();
        let mut tx = db.pool().begin().await?;

        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (name, bio, image, created_at, updated_at) \
             VALUES (?, '', ?, ?, ?) RETURNING *",
        )
        .bind(&new.username)
        .bind(DEFAULT_IMAGE)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, hash, profile_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&new.email)
        .bind(&new.hash)
        .bind(profile.id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Account { user, profile })
    }
}

impl Account {
    pub async fn load(db: &Database, user_id: i64) -> Result<Option<Account>, DatabaseError> {
        match db.users().find_by_id(user_id).await? {
            Some(user) => Self::with_profile(db, user).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(db: &Database, email: &str) -> Result<Option<Account>, DatabaseError> {
        match db.users().find_by("email", email.to_string()).await? {
            Some(user) => Self::with_profile(db, user).await.map(Some),
            None => Ok(None),
        }
    }

    async fn with_profile(db: &Database, user: User) -> Result<Account, DatabaseError> {
        let profile = db.profiles().find_by_id(user.profile_id).await?.ok_or_else(|| {
            DatabaseError::MissingAssociation(format!("profile {} of user {}", user.profile_id, user.id))
        })?;
        Ok(Account { user, profile })
    }

    /// Apply `changes` and return the account as stored afterwards
    pub async fn update(&self, db: &Database, changes: AccountChanges) -> Result<Account, DatabaseError> {
        let now = Utc::now();
        let mut tx = db.pool().begin().await?;

        if changes.touches_profile() {
            sqlx::query(
                "UPDATE profiles SET name = COALESCE(?, name), bio = COALESCE(?, bio), \
                 image = COALESCE(?, image), updated_at = ? WHERE id = ?",
            )
            .bind(changes.username.as_deref())
            .bind(changes.bio.as_deref())
            .bind(changes.image.as_deref())
            .bind(now)
            .bind(self.profile.id)
            .execute(&mut *tx)
            .await?;
        }

        if changes.touches_user() {
            sqlx::query(
                "UPDATE users SET email = COALESCE(?, email), hash = COALESCE(?, hash), \
                 updated_at = ? WHERE id = ?",
            )
            .bind(changes.email.as_deref())
            .bind(changes.hash.as_deref())
            .bind(now)
            .bind(self.user.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::load(db, self.user.id)
            .await?
            .ok_or_else(|| DatabaseError::MissingAssociation(format!("user {}", self.user.id)))
    }
}
