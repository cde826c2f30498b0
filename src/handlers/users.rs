// handlers/users.rs - Registration, login and the current user

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;

use super::{non_empty, parse_body};
use crate::api::format::{UserDto, UserResponse};
use crate::auth::AuthError;
use crate::database::models::{Account, AccountChanges, NewUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// POST /api/users - Register an account and its profile
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserEnvelope<RegisterUser>>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let UserEnvelope { user } = parse_body(payload, "Parameter")?;

    let (Some(username), Some(email), Some(password)) = (
        non_empty(user.username),
        non_empty(user.email),
        non_empty(user.password),
    ) else {
        return Err(ApiError::bad_request("Parameter"));
    };

    let hash = state.passwords.hash(password).await?;
    let account = User::create_with_profile(&state.db, NewUser { username, email, hash }).await?;
    let token = state.tokens.issue(account.user.id)?;

    tracing::info!("Registered user {} (profile {})", account.user.id, account.profile.name);
    Ok(ApiResponse::created(UserResponse {
        user: UserDto::new(&account, token),
    }))
}

/// POST /api/users/login - Exchange credentials for a token
///
/// An unknown email and a wrong password produce the same 403 response.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<UserEnvelope<LoginUser>>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let UserEnvelope { user } = parse_body(payload, "Data")?;

    let (Some(email), Some(password)) = (non_empty(user.email), non_empty(user.password)) else {
        return Err(ApiError::bad_request("Data"));
    };

    let account = Account::find_by_email(&state.db, &email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    state.passwords.verify(password, account.user.hash.clone()).await?;

    let token = state.tokens.issue(account.user.id)?;
    Ok(ApiResponse::success(UserResponse {
        user: UserDto::new(&account, token),
    }))
}

/// GET /api/user - The authenticated account with a fresh token
pub async fn current(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> ApiResult<UserResponse> {
    let token = state.tokens.issue(account.user.id)?;
    Ok(ApiResponse::success(UserResponse {
        user: UserDto::new(&account, token),
    }))
}

/// PUT /api/user - Partial update of account and profile fields
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    payload: Result<Json<UserEnvelope<UpdateUser>>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let UserEnvelope { user } = parse_body(payload, "Data")?;

    let hash = match non_empty(user.password) {
        Some(password) => Some(state.passwords.hash(password).await?),
        None => None,
    };
    let changes = AccountChanges {
        username: non_empty(user.username),
        bio: non_empty(user.bio),
        image: non_empty(user.image),
        email: non_empty(user.email),
        hash,
    };

    let updated = account.update(&state.db, changes).await?;
    let token = state.tokens.issue(updated.user.id)?;
    Ok(ApiResponse::success(UserResponse {
        user: UserDto::new(&updated, token),
    }))
}
