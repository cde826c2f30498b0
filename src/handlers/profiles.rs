// handlers/profiles.rs - Public profiles and follow toggling

use axum::extract::{Path, State};
use axum::http::Method;

use crate::api::format::{Presenter, ProfileResponse};
use crate::database::models::{Follow, Profile};
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Viewer};
use crate::state::AppState;

async fn find_profile(db: &Database, username: &str) -> Result<Profile, ApiError> {
    Profile::find_by_name(db, username)
        .await?
        .ok_or_else(|| ApiError::not_found("profile"))
}

/// GET /api/profiles/:username
pub async fn get(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(username): Path<String>,
) -> ApiResult<ProfileResponse> {
    let profile = find_profile(&state.db, &username).await?;
    let profile = Presenter::new(&state.db, viewer.as_ref().map(|v| &v.profile))
        .profile(profile)
        .await?;
    Ok(ApiResponse::success(ProfileResponse { profile }))
}

/// POST/DELETE /api/profiles/:username/follow - Idempotent follow toggle
pub async fn toggle_follow(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(account): CurrentUser,
    Path(username): Path<String>,
) -> ApiResult<ProfileResponse> {
    let target = find_profile(&state.db, &username).await?;

    if method == Method::DELETE {
        Follow::remove(&state.db, account.profile.id, target.id).await?;
    } else {
        Follow::find_or_create(&state.db, account.profile.id, target.id).await?;
    }

    let profile = Presenter::new(&state.db, Some(&account.profile))
        .profile(target)
        .await?;
    Ok(ApiResponse::success(ProfileResponse { profile }))
}
