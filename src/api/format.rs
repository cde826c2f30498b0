use std::collections::{HashMap, HashSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::database::models::{Account, Article, Comment, Favorite, Follow, Profile, Tag};
use crate::database::{Database, DatabaseError};

/// UTC with millisecond precision and a `Z` suffix: `2016-02-18T03:22:56.637Z`
pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(date))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDto {
    pub username: String,
    pub bio: String,
    pub image: String,
    pub following: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: ProfileDto,
}

/// Self view of the authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: String,
    pub image: String,
}

impl UserDto {
    pub fn new(account: &Account, token: String) -> Self {
        Self {
            email: account.user.email.clone(),
            token,
            username: account.profile.name.clone(),
            bio: account.profile.bio.clone(),
            image: account.profile.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub author: ProfileDto,
}

// Response envelopes

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: ProfileDto,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleDto>,
    pub articles_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: CommentDto,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// Builds response DTOs relative to the requesting viewer.
///
/// Viewer-dependent fields (`following`, `favorited`) are false for an
/// anonymous viewer. List conversions resolve authors, tags, favorite counts
/// and viewer relations with one query each rather than one per row.
pub struct Presenter<'a> {
    db: &'a Database,
    viewer: Option<&'a Profile>,
}

impl<'a> Presenter<'a> {
    pub fn new(db: &'a Database, viewer: Option<&'a Profile>) -> Self {
        Self { db, viewer }
    }

    pub async fn profile(&self, profile: Profile) -> Result<ProfileDto, DatabaseError> {
        let following = self.following(&[profile.id]).await?;
        Ok(profile_dto(profile, &following))
    }

    pub async fn article(&self, article: Article) -> Result<ArticleDto, DatabaseError> {
        let id = article.id;
        self.articles(vec![article])
            .await?
            .pop()
            .ok_or_else(|| DatabaseError::MissingAssociation(format!("article {}", id)))
    }

    pub async fn articles(&self, articles: Vec<Article>) -> Result<Vec<ArticleDto>, DatabaseError> {
        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        let author_ids: Vec<i64> = articles.iter().map(|a| a.author_id).collect();

        let authors = self.profiles(&author_ids).await?;
        let mut tags = Tag::names_for_articles(self.db, &ids).await?;
        let counts = Favorite::counts_for(self.db, &ids).await?;
        let favorited = match self.viewer {
            Some(viewer) => Favorite::favorited_among(self.db, viewer.id, &ids).await?,
            None => HashSet::new(),
        };

        articles
            .into_iter()
            .map(|article| -> Result<ArticleDto, DatabaseError> {
                let author = authors
                    .get(&article.author_id)
                    .cloned()
                    .ok_or_else(|| missing_author("article", article.id, article.author_id))?;

                Ok(ArticleDto {
                    tag_list: tags.remove(&article.id).unwrap_or_default(),
                    favorited: favorited.contains(&article.id),
                    favorites_count: counts.get(&article.id).copied().unwrap_or(0),
                    author,
                    slug: article.slug,
                    title: article.title,
                    description: article.description,
                    body: article.body,
                    created_at: article.created_at,
                    updated_at: article.updated_at,
                })
            })
            .collect()
    }

    pub async fn comment(&self, comment: Comment) -> Result<CommentDto, DatabaseError> {
        let id = comment.id;
        self.comments(vec![comment])
            .await?
            .pop()
            .ok_or_else(|| DatabaseError::MissingAssociation(format!("comment {}", id)))
    }

    pub async fn comments(&self, comments: Vec<Comment>) -> Result<Vec<CommentDto>, DatabaseError> {
        let author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
        let authors = self.profiles(&author_ids).await?;

        comments
            .into_iter()
            .map(|comment| -> Result<CommentDto, DatabaseError> {
                let author = authors
                    .get(&comment.author_id)
                    .cloned()
                    .ok_or_else(|| missing_author("comment", comment.id, comment.author_id))?;

                Ok(CommentDto {
                    id: comment.id,
                    created_at: comment.created_at,
                    updated_at: comment.updated_at,
                    body: comment.body,
                    author,
                })
            })
            .collect()
    }

    /// Profile DTOs keyed by profile id
    async fn profiles(&self, ids: &[i64]) -> Result<HashMap<i64, ProfileDto>, DatabaseError> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let profiles = self.db.profiles().find_by_ids(&ids).await?;
        let following = self.following(&ids).await?;

        Ok(profiles
            .into_iter()
            .map(|profile| (profile.id, profile_dto(profile, &following)))
            .collect())
    }

    async fn following(&self, ids: &[i64]) -> Result<HashSet<i64>, DatabaseError> {
        match self.viewer {
            Some(viewer) => Follow::following_among(self.db, viewer.id, ids).await,
            None => Ok(HashSet::new()),
        }
    }
}

fn profile_dto(profile: Profile, following: &HashSet<i64>) -> ProfileDto {
    ProfileDto {
        following: following.contains(&profile.id),
        username: profile.name,
        bio: profile.bio,
        image: profile.image,
    }
}

fn missing_author(kind: &str, id: i64, author_id: i64) -> DatabaseError {
    DatabaseError::MissingAssociation(format!("author {} of {} {}", author_id, kind, id))
}
