use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthError;
use crate::database::models::Account;
use crate::error::ApiError;
use crate::state::AppState;

const TOKEN_PREFIX: &str = "Token ";

/// How a route treats the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Never authenticates, even when a header is sent
    Public,
    /// Binds a viewer when a header is present, proceeds anonymously otherwise
    Optional,
    /// Rejects requests without a valid token for a live user
    Required,
}

/// Policy for a route, keyed by method and matched route template
pub fn policy_for(method: &Method, path: &str) -> AuthPolicy {
    match (method, path) {
        (&Method::GET, "/api/articles") | (&Method::GET, "/api/profiles/:username") => AuthPolicy::Optional,

        (&Method::POST, "/api/users")
        | (&Method::POST, "/api/users/login")
        | (&Method::GET, "/api/articles/:slug")
        | (&Method::GET, "/api/articles/:slug/comments")
        | (&Method::GET, "/api/tags")
        | (&Method::GET, "/api/health") => AuthPolicy::Public,

        _ => AuthPolicy::Required,
    }
}

/// Authenticated account bound to the request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Account);

/// Possibly anonymous viewer of an optional-auth route
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Account>);

/// Resolves the `Authorization: Token <jwt>` header into a [`CurrentUser`]
/// request extension according to the route's [`AuthPolicy`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let policy = policy_for(request.method(), &path);

    if policy == AuthPolicy::Public {
        return Ok(next.run(request).await);
    }

    match extract_token(request.headers()).map(str::to_owned) {
        Some(token) => {
            let account = authenticate(&state, &token).await?;
            request.extensions_mut().insert(CurrentUser(account));
        }
        None if policy == AuthPolicy::Optional => {}
        None => {
            tracing::debug!("Rejected {} {}: no Authorization header", request.method(), path);
            return Err(AuthError::MissingHeader.into());
        }
    }

    Ok(next.run(request).await)
}

/// Token carried by the header, if any. An empty header counts as absent.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.strip_prefix(TOKEN_PREFIX).unwrap_or(value).trim())
}

async fn authenticate(state: &AppState, token: &str) -> Result<Account, ApiError> {
    let claims = state.tokens.validate(token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        e
    })?;

    match Account::load(&state.db, claims.id).await? {
        Some(account) => Ok(account),
        None => {
            tracing::warn!("Token for unknown user id {}", claims.id);
            Err(AuthError::UnknownUser.into())
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AuthError::MissingHeader.into())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = parts.extensions.get::<CurrentUser>().map(|user| user.0.clone());
        Ok(Viewer(account))
    }
}
