pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{Entity, Filter, Page, Repository};

use sqlx::SqlitePool;

use models::{Article, Comment, Favorite, Follow, Profile, Tag, User};

/// Handle to the relational store, cloned into every component that needs it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.pool.clone())
    }

    pub fn profiles(&self) -> Repository<Profile> {
        Repository::new(self.pool.clone())
    }

    pub fn articles(&self) -> Repository<Article> {
        Repository::new(self.pool.clone())
    }

    pub fn tags(&self) -> Repository<Tag> {
        Repository::new(self.pool.clone())
    }

    pub fn comments(&self) -> Repository<Comment> {
        Repository::new(self.pool.clone())
    }

    pub fn follows(&self) -> Repository<Follow> {
        Repository::new(self.pool.clone())
    }

    pub fn favorites(&self) -> Repository<Favorite> {
        Repository::new(self.pool.clone())
    }
}
