use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::database::repository::push_id_list;
use crate::database::{Database, DatabaseError, Entity};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Tag {
    const TABLE: &'static str = "tags";
}

impl Tag {
    /// Reuse the live tag called `name`, inserting it first if there is none.
    /// Runs on a caller-supplied connection so it can join a transaction.
    pub async fn find_or_create(conn: &mut SqliteConnection, name: &str) -> Result<Tag, DatabaseError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO tags (name, created_at, updated_at) VALUES (?, ?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let tag = sqlx::query_as::<_, Tag>(
            "SELECT * FROM tags WHERE name = ? AND deleted_at IS NULL LIMIT 1",
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
        Ok(tag)
    }

    pub async fn attach(conn: &mut SqliteConnection, article_id: i64, tag_id: i64) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO article_tags (article_id, tag_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
            .bind(article_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Names of every live tag, oldest first
    pub async fn all_names(db: &Database) -> Result<Vec<String>, DatabaseError> {
        let tags = db.tags().all().await?;
        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }

    /// Ids of the articles carrying `tag_id`
    pub async fn article_ids(db: &Database, tag_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT article_id FROM article_tags WHERE tag_id = ? ORDER BY article_id",
        )
        .bind(tag_id)
        .fetch_all(db.pool())
        .await?;
        Ok(ids)
    }

    /// Tag names per article, each list in the order the tags were attached
    pub async fn names_for_articles(
        db: &Database,
        article_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT at.article_id, t.name FROM article_tags at \
             JOIN tags t ON t.id = at.tag_id WHERE t.deleted_at IS NULL",
        );
        push_id_list(&mut qb, "at.article_id", article_ids);
        qb.push(" ORDER BY at.id");

        let rows = qb.build_query_as::<(i64, String)>().fetch_all(db.pool()).await?;

        let mut names: HashMap<i64, Vec<String>> = HashMap::new();
        for (article_id, name) in rows {
            names.entry(article_id).or_default().push(name);
        }
        Ok(names)
    }
}
