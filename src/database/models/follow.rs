use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use crate::database::repository::push_id_list;
use crate::database::{Database, DatabaseError, Entity};

/// `user_id` follows `following_id`; both are profile ids.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Follow {
    const TABLE: &'static str = "follows";
}

impl Follow {
    /// Idempotent: the partial unique index turns a repeated follow into a no-op.
    pub async fn find_or_create(db: &Database, follower: i64, following: i64) -> Result<(), DatabaseError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO follows (user_id, following_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(following)
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await?;
        Ok(())
    }

    /// Returns whether a live relation was removed
    pub async fn remove(db: &Database, follower: i64, following: i64) -> Result<bool, DatabaseError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE follows SET deleted_at = ?, updated_at = ? \
             WHERE user_id = ? AND following_id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(follower)
        .bind(following)
        .execute(db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Profile ids `follower` currently follows
    pub async fn following_ids(db: &Database, follower: i64) -> Result<Vec<i64>, DatabaseError> {
        let follows = db.follows().find_all_by("user_id", follower).await?;
        Ok(follows.into_iter().map(|f| f.following_id).collect())
    }

    /// The subset of `candidates` that `follower` follows
    pub async fn following_among(
        db: &Database,
        follower: i64,
        candidates: &[i64],
    ) -> Result<HashSet<i64>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT following_id FROM follows WHERE deleted_at IS NULL AND user_id = ",
        );
        qb.push_bind(follower);
        push_id_list(&mut qb, "following_id", candidates);

        let rows = qb.build_query_as::<(i64,)>().fetch_all(db.pool()).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
