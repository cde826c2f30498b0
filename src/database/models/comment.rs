use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Article, Profile};
use crate::database::{Database, DatabaseError, Entity};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub article_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Comment {
    const TABLE: &'static str = "comments";
}

impl Comment {
    pub async fn create(db: &Database, article: &Article, author: &Profile, body: &str) -> Result<Comment, DatabaseError> {
        let now = Utc::now();
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (body, article_id, author_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(body)
        .bind(article.id)
        .bind(author.id)
        .bind(now)
        .bind(now)
        .fetch_one(db.pool())
        .await?;
        Ok(comment)
    }

    /// Live comments on an article, oldest first
    pub async fn for_article(db: &Database, article_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        db.comments().find_all_by("article_id", article_id).await
    }
}
