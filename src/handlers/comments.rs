// handlers/comments.rs - Comments under an article

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ensure_author, find_article, non_empty, parse_body};
use crate::api::format::{CommentResponse, CommentsResponse, Presenter};
use crate::database::models::Comment;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentEnvelope {
    pub comment: NewComment,
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub body: Option<String>,
}

/// GET /api/articles/:slug/comments - Oldest first
pub async fn list(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<CommentsResponse> {
    let article = find_article(&state.db, &slug).await?;
    let comments = Comment::for_article(&state.db, article.id).await?;
    let comments = Presenter::new(&state.db, None).comments(comments).await?;
    Ok(ApiResponse::success(CommentsResponse { comments }))
}

/// POST /api/articles/:slug/comments
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(slug): Path<String>,
    payload: Result<Json<CommentEnvelope>, JsonRejection>,
) -> ApiResult<CommentResponse> {
    let CommentEnvelope { comment } = parse_body(payload, "Parameter")?;
    let body = non_empty(comment.body).ok_or_else(|| ApiError::bad_request("Parameter"))?;

    let article = find_article(&state.db, &slug).await?;
    let comment = Comment::create(&state.db, &article, &account.profile, &body).await?;

    let comment = Presenter::new(&state.db, Some(&account.profile)).comment(comment).await?;
    Ok(ApiResponse::created(CommentResponse { comment }))
}

/// DELETE /api/articles/:slug/comments/:id
///
/// Deletes by id without checking that the comment exists or belongs to the
/// article; deleting an absent comment still succeeds.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path((_slug, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let id: i64 = id.parse().map_err(|_| ApiError::not_found("comment"))?;

    if state.config.security.enforce_ownership {
        if let Some(comment) = state.db.comments().find_by_id(id).await? {
            ensure_author(&state, comment.author_id, &account)?;
        }
    }

    if state.db.comments().soft_delete(id).await? {
        tracing::info!("Profile {} deleted comment {}", account.profile.id, id);
    }
    Ok(ApiResponse::success(json!({})))
}
