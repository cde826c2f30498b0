use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use crate::database::repository::push_id_list;
use crate::database::{Database, DatabaseError, Entity};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub article_id: i64,
    pub favorited_by_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Favorite {
    const TABLE: &'static str = "favorites";
}

impl Favorite {
    pub async fn find_or_create(db: &Database, article_id: i64, profile_id: i64) -> Result<(), DatabaseError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO favorites (article_id, favorited_by_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(article_id)
        .bind(profile_id)
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await?;
        Ok(())
    }

    pub async fn remove(db: &Database, article_id: i64, profile_id: i64) -> Result<bool, DatabaseError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE favorites SET deleted_at = ?, updated_at = ? \
             WHERE article_id = ? AND favorited_by_id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(article_id)
        .bind(profile_id)
        .execute(db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of the articles `profile_id` has favorited
    pub async fn article_ids_for(db: &Database, profile_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let favorites = db.favorites().find_all_by("favorited_by_id", profile_id).await?;
        Ok(favorites.into_iter().map(|f| f.article_id).collect())
    }

    /// Live favorite count per article. Articles nobody favorited are absent.
    pub async fn counts_for(db: &Database, article_ids: &[i64]) -> Result<HashMap<i64, i64>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT article_id, COUNT(*) FROM favorites WHERE deleted_at IS NULL",
        );
        push_id_list(&mut qb, "article_id", article_ids);
        qb.push(" GROUP BY article_id");

        let rows = qb.build_query_as::<(i64, i64)>().fetch_all(db.pool()).await?;
        Ok(rows.into_iter().collect())
    }

    /// The subset of `article_ids` that `profile_id` has favorited
    pub async fn favorited_among(
        db: &Database,
        profile_id: i64,
        article_ids: &[i64],
    ) -> Result<HashSet<i64>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT article_id FROM favorites WHERE deleted_at IS NULL AND favorited_by_id = ",
        );
        qb.push_bind(profile_id);
        push_id_list(&mut qb, "article_id", article_ids);

        let rows = qb.build_query_as::<(i64,)>().fetch_all(db.pool()).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Article, NewArticle};
    use crate::testing::{memory_database, seed_account};

    #[tokio::test]
    async fn counts_distinct_favoriters() {
        let db = memory_database().await;
        let jake = seed_account(&db, "jake").await.profile;
        let sally = seed_account(&db, "sally").await.profile;
        let article = Article::create(
            &db,
            &jake,
            NewArticle {
                title: "Dragons".into(),
                description: "d".into(),
                body: "b".into(),
                tag_list: vec![],
            },
        )
        .await
        .unwrap();

        Favorite::find_or_create(&db, article.id, jake.id).await.unwrap();
        Favorite::find_or_create(&db, article.id, sally.id).await.unwrap();
        Favorite::find_or_create(&db, article.id, sally.id).await.unwrap();

        let counts = Favorite::counts_for(&db, &[article.id]).await.unwrap();
        assert_eq!(counts.get(&article.id), Some(&2));

        assert!(Favorite::remove(&db, article.id, sally.id).await.unwrap());
        let counts = Favorite::counts_for(&db, &[article.id]).await.unwrap();
        assert_eq!(counts.get(&article.id), Some(&1));

        assert!(Favorite::favorited_among(&db, sally.id, &[article.id]).await.unwrap().is_empty());
        assert_eq!(Favorite::article_ids_for(&db, jake.id).await.unwrap(), vec![article.id]);
    }
}
