use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Profile, Tag};
use crate::database::{Database, DatabaseError, Entity};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Article {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Article {
    const TABLE: &'static str = "articles";
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// URL-safe slug for `title`, made unique with a random suffix
pub fn generate_slug(title: &str) -> String {
    slug::slugify(format!("{} {}", title, Uuid::new_v4()))
}

impl Article {
    pub async fn find_by_slug(db: &Database, slug: &str) -> Result<Option<Article>, DatabaseError> {
        db.articles().find_by("slug", slug.to_string()).await
    }

    /// Insert the article and link its tags, creating tags that don't exist yet
    pub async fn create(db: &Database, author: &Profile, new: NewArticle) -> Result<Article, DatabaseError> {
        let now = Utc::now();
        let mut tx = db.pool().begin().await?;

        let article = sqlx::query_as::<_, Article>(
            "INSERT INTO articles (slug, title, description, body, author_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(generate_slug(&new.title))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.body)
        .bind(author.id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for name in new.tag_list.iter().filter(|name| !name.is_empty()) {
            let tag = Tag::find_or_create(&mut tx, name).await?;
            Tag::attach(&mut tx, article.id, tag.id).await?;
        }

        tx.commit().await?;
        Ok(article)
    }

    /// Apply `changes`, regenerating the slug only when the title actually changes.
    /// Returns `None` if the article was deleted in the meantime.
    pub async fn update(&self, db: &Database, changes: ArticleChanges) -> Result<Option<Article>, DatabaseError> {
        let slug = match &changes.title {
            Some(title) if *title != self.title => generate_slug(title),
            _ => self.slug.clone(),
        };

        let article = sqlx::query_as::<_, Article>(
            "UPDATE articles SET slug = ?, title = COALESCE(?, title), \
             description = COALESCE(?, description), body = COALESCE(?, body), updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL RETURNING *",
        )
        .bind(slug)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.body.as_deref())
        .bind(Utc::now())
        .bind(self.id)
        .fetch_optional(db.pool())
        .await?;
        Ok(article)
    }
}
