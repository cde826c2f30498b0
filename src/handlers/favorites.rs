// handlers/favorites.rs - POST/DELETE /api/articles/:slug/favorite

use axum::extract::{Path, State};
use axum::http::Method;

use super::find_article;
use crate::api::format::{ArticleResponse, Presenter};
use crate::database::models::Favorite;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// POST favorites the article, DELETE unfavorites it. Both are idempotent and
/// answer with the article as the caller now sees it.
pub async fn toggle(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(account): CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<ArticleResponse> {
    let article = find_article(&state.db, &slug).await?;

    if method == Method::DELETE {
        Favorite::remove(&state.db, article.id, account.profile.id).await?;
    } else {
        Favorite::find_or_create(&state.db, article.id, account.profile.id).await?;
    }

    let article = Presenter::new(&state.db, Some(&account.profile)).article(article).await?;
    Ok(ApiResponse::success(ArticleResponse { article }))
}
