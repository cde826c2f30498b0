// handlers/tags.rs - GET /api/tags

use axum::extract::State;

use crate::api::format::TagsResponse;
use crate::database::models::Tag;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<TagsResponse> {
    let tags = Tag::all_names(&state.db).await?;
    Ok(ApiResponse::success(TagsResponse { tags }))
}
