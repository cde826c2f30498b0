// handlers/articles.rs - Article listing, feed and CRUD

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ensure_author, find_article, non_empty, parse_body, parse_query};
use crate::api::format::{ArticleResponse, ArticlesResponse, Presenter};
use crate::database::models::{Article, ArticleChanges, NewArticle};
use crate::database::query_builder::{ArticleFilter, ArticleQuery};
use crate::database::Page;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Viewer};
use crate::state::AppState;

/// Raw query values; unparsable pagination falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleEnvelope<T> {
    pub article: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// GET /api/articles - Newest articles, optionally filtered by tag, author or favoriter
pub async fn list(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<ArticlesResponse> {
    let query = parse_query(query);
    let page = Page::parse(query.limit.as_deref(), query.offset.as_deref(), &state.config.api);
    let filter = ArticleFilter::from_params(
        query.tag.as_deref(),
        query.author.as_deref(),
        query.favorited.as_deref(),
    );

    let (articles, total) = ArticleQuery::list(&state.db, &filter, page).await?;
    let articles = Presenter::new(&state.db, viewer.as_ref().map(|v| &v.profile))
        .articles(articles)
        .await?;

    Ok(ApiResponse::success(ArticlesResponse {
        articles,
        articles_count: total,
    }))
}

/// GET /api/articles/feed - Articles by the profiles the caller follows
pub async fn feed(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> ApiResult<ArticlesResponse> {
    let query = parse_query(query);
    let page = Page::parse(query.limit.as_deref(), query.offset.as_deref(), &state.config.api);

    let (articles, total) = ArticleQuery::feed(&state.db, &account.profile, page).await?;
    let articles = Presenter::new(&state.db, Some(&account.profile))
        .articles(articles)
        .await?;

    Ok(ApiResponse::success(ArticlesResponse {
        articles,
        articles_count: total,
    }))
}

/// GET /api/articles/:slug
pub async fn get(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<ArticleResponse> {
    let article = find_article(&state.db, &slug).await?;
    let article = Presenter::new(&state.db, None).article(article).await?;
    Ok(ApiResponse::success(ArticleResponse { article }))
}

/// POST /api/articles - Publish an article authored by the caller
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    payload: Result<Json<ArticleEnvelope<CreateArticle>>, JsonRejection>,
) -> ApiResult<ArticleResponse> {
    let ArticleEnvelope { article } = parse_body(payload, "Data")?;

    let (Some(title), Some(description), Some(body)) = (
        non_empty(article.title),
        non_empty(article.description),
        non_empty(article.body),
    ) else {
        return Err(ApiError::bad_request("Data"));
    };

    let new = NewArticle {
        title,
        description,
        body,
        tag_list: article.tag_list.unwrap_or_default(),
    };
    let article = Article::create(&state.db, &account.profile, new).await?;
    tracing::info!("Profile {} published article {}", account.profile.id, article.slug);

    let article = Presenter::new(&state.db, Some(&account.profile)).article(article).await?;
    Ok(ApiResponse::created(ArticleResponse { article }))
}

/// PUT /api/articles/:slug - Change title, description or body
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(slug): Path<String>,
    payload: Result<Json<ArticleEnvelope<UpdateArticle>>, JsonRejection>,
) -> ApiResult<ArticleResponse> {
    let ArticleEnvelope { article: changes } = parse_body(payload, "Data")?;

    let article = find_article(&state.db, &slug).await?;
    ensure_author(&state, article.author_id, &account)?;

    let changes = ArticleChanges {
        title: non_empty(changes.title),
        description: non_empty(changes.description),
        body: non_empty(changes.body),
    };
    let article = article
        .update(&state.db, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("article"))?;

    let article = Presenter::new(&state.db, Some(&account.profile)).article(article).await?;
    Ok(ApiResponse::success(ArticleResponse { article }))
}

/// DELETE /api/articles/:slug
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<Value> {
    let article = find_article(&state.db, &slug).await?;
    ensure_author(&state, article.author_id, &account)?;

    state.db.articles().soft_delete(article.id).await?;
    tracing::info!("Profile {} deleted article {}", account.profile.id, article.slug);
    Ok(ApiResponse::success(json!({})))
}
