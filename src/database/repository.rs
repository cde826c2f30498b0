use chrono::Utc;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Encode, FromRow, QueryBuilder, Type};

use crate::config::ApiConfig;
use crate::database::manager::DatabaseError;

/// A table the generic repository can read and soft-delete.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: &'static str;
}

/// Row filter for paginated reads. Column names are compile-time constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Eq(&'static str, i64),
    In(&'static str, Vec<i64>),
}

impl Filter {
    fn push_to(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Filter::All => {}
            Filter::Eq(column, value) => {
                qb.push(" AND ").push(*column).push(" = ").push_bind(*value);
            }
            Filter::In(column, values) => push_id_list(qb, column, values),
        }
    }
}

/// Append ` AND <column> IN (...)`; an empty id set matches nothing.
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, ids: &[i64]) {
    if ids.is_empty() {
        qb.push(" AND 0");
        return;
    }

    qb.push(" AND ").push(column).push(" IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Limit/offset pair for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 20;

    /// Parse raw query values. Absent, non-numeric or negative values fall
    /// back to the defaults; they are never an error.
    pub fn parse(limit: Option<&str>, offset: Option<&str>, api: &ApiConfig) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v >= 0)
        };

        let mut limit = parse(limit).unwrap_or(api.default_limit);
        if let Some(max) = api.max_limit {
            limit = limit.min(max);
        }

        Self {
            limit,
            offset: parse(offset).unwrap_or(0),
        }
    }
}

pub struct Repository<T> {
    pool: SqlitePool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Entity,
{
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        self.find_by("id", id).await
    }

    pub async fn find_by<V>(&self, column: &'static str, value: V) -> Result<Option<T>, DatabaseError>
    where
        V: for<'q> Encode<'q, Sqlite> + Type<Sqlite> + Send + 'static,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ? AND deleted_at IS NULL LIMIT 1",
            T::TABLE,
            column
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_all_by<V>(&self, column: &'static str, value: V) -> Result<Vec<T>, DatabaseError>
    where
        V: for<'q> Encode<'q, Sqlite> + Type<Sqlite> + Send + 'static,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ? AND deleted_at IS NULL ORDER BY id",
            T::TABLE,
            column
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        qb.push(T::TABLE).push(" WHERE deleted_at IS NULL");
        push_id_list(&mut qb, "id", ids);
        let rows = qb.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn all(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE deleted_at IS NULL ORDER BY id", T::TABLE);
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM ");
        qb.push(T::TABLE).push(" WHERE deleted_at IS NULL");
        filter.push_to(&mut qb);
        let (count,) = qb.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Newest rows first, plus the total number of matching rows before paging.
    pub async fn page(&self, filter: &Filter, page: Page) -> Result<(Vec<T>, i64), DatabaseError> {
        let total = self.count(filter).await?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        qb.push(T::TABLE).push(" WHERE deleted_at IS NULL");
        filter.push_to(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        let rows = qb.build_query_as::<T>().fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    /// Mark a row deleted. Returns whether a live row was affected.
    pub async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let now = Utc::now();
        let sql = format!(
            "UPDATE {} SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
            T::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::tag::Tag;
    use crate::testing::memory_database;

    #[test]
    fn page_defaults_for_missing_or_garbage_values() {
        let api = AppConfig::development().api;
        assert_eq!(Page::parse(None, None, &api), Page { limit: 20, offset: 0 });
        assert_eq!(Page::parse(Some("abc"), Some("x1"), &api), Page { limit: 20, offset: 0 });
        assert_eq!(Page::parse(Some("-5"), Some("-1"), &api), Page { limit: 20, offset: 0 });
        assert_eq!(Page::parse(Some("5"), Some("10"), &api), Page { limit: 5, offset: 10 });
    }

    #[test]
    fn page_limit_is_clamped_to_configured_maximum() {
        let api = AppConfig::production().api;
        assert_eq!(Page::parse(Some("5000"), None, &api).limit, 100);
    }

    #[tokio::test]
    async fn soft_deleted_rows_disappear_from_reads() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let rust = Tag::find_or_create(&mut conn, "rust").await.unwrap();
        Tag::find_or_create(&mut conn, "go").await.unwrap();
        drop(conn);

        let tags = db.tags();
        assert_eq!(tags.all().await.unwrap().len(), 2);
        assert!(tags.soft_delete(rust.id).await.unwrap());
        assert!(!tags.soft_delete(rust.id).await.unwrap());

        assert!(tags.find_by_id(rust.id).await.unwrap().is_none());
        assert!(tags.find_by("name", "rust".to_string()).await.unwrap().is_none());
        assert_eq!(tags.count(&Filter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_in_filter_matches_nothing() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        Tag::find_or_create(&mut conn, "rust").await.unwrap();
        drop(conn);

        let (rows, total) = db
            .tags()
            .page(&Filter::In("id", vec![]), Page::default())
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }
}
