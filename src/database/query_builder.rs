use crate::database::models::{Article, Favorite, Follow, Profile, Tag};
use crate::database::{Database, DatabaseError, Filter, Page};

/// Which single filter a listing honours. Precedence is tag, then author,
/// then favorited; an empty value counts as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    Tag(String),
    Author(String),
    FavoritedBy(String),
    None,
}

impl ArticleFilter {
    pub fn from_params(tag: Option<&str>, author: Option<&str>, favorited: Option<&str>) -> Self {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(tag) = present(tag) {
            ArticleFilter::Tag(tag)
        } else if let Some(author) = present(author) {
            ArticleFilter::Author(author)
        } else if let Some(username) = present(favorited) {
            ArticleFilter::FavoritedBy(username)
        } else {
            ArticleFilter::None
        }
    }

    /// Translate into a row filter. `None` means the named tag or profile
    /// doesn't exist, so nothing can match.
    async fn resolve(&self, db: &Database) -> Result<Option<Filter>, DatabaseError> {
        let filter = match self {
            ArticleFilter::None => Filter::All,
            ArticleFilter::Tag(name) => match db.tags().find_by("name", name.clone()).await? {
                Some(tag) => Filter::In("id", Tag::article_ids(db, tag.id).await?),
                None => return Ok(None),
            },
            ArticleFilter::Author(name) => match Profile::find_by_name(db, name).await? {
                Some(author) => Filter::Eq("author_id", author.id),
                None => return Ok(None),
            },
            ArticleFilter::FavoritedBy(name) => match Profile::find_by_name(db, name).await? {
                Some(profile) => Filter::In("id", Favorite::article_ids_for(db, profile.id).await?),
                None => return Ok(None),
            },
        };
        Ok(Some(filter))
    }
}

/// Article listings: newest first, paginated, with the pre-pagination total.
pub struct ArticleQuery;

impl ArticleQuery {
    pub async fn list(db: &Database, filter: &ArticleFilter, page: Page) -> Result<(Vec<Article>, i64), DatabaseError> {
        match filter.resolve(db).await? {
            Some(filter) => db.articles().page(&filter, page).await,
            None => Ok((vec![], 0)),
        }
    }

    /// Articles written by the profiles `viewer` follows. Following nobody
    /// yields an empty feed.
    pub async fn feed(db: &Database, viewer: &Profile, page: Page) -> Result<(Vec<Article>, i64), DatabaseError> {
        let following = Follow::following_ids(db, viewer.id).await?;
        db.articles().page(&Filter::In("author_id", following), page).await
    }
}
