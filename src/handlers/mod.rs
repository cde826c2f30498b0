// handlers/mod.rs - Request handlers, one module per resource
//
// Authentication is resolved by the auth middleware before a handler runs.
// Handlers that need an identity take `CurrentUser`; optional-auth handlers
// take `Viewer`; public handlers take neither.

pub mod articles;
pub mod comments;
pub mod favorites;
pub mod profiles;
pub mod tags;
pub mod users;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{Account, Article};
use crate::database::{Database, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/health - Store connectivity probe
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    match DatabaseManager::health_check(state.db.pool()).await {
        Ok(()) => Ok(ApiResponse::success(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Database"))
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route")
}

/// Unwrap a JSON body, reporting malformed or incomplete payloads under `field`
pub(crate) fn parse_body<T>(payload: Result<Json<T>, JsonRejection>, field: &str) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::bad_request(field))
        }
    }
}

/// Unwrap query parameters; an unparsable query string behaves like an empty one
pub(crate) fn parse_query<T: Default>(query: Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::debug!("Ignoring query string: {}", rejection.body_text());
            T::default()
        }
    }
}

/// Empty strings count as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub(crate) async fn find_article(db: &Database, slug: &str) -> Result<Article, ApiError> {
    Article::find_by_slug(db, slug)
        .await?
        .ok_or_else(|| ApiError::not_found("article"))
}

/// With ownership enforcement on, only the author may modify a resource
pub(crate) fn ensure_author(state: &AppState, author_id: i64, account: &Account) -> Result<(), ApiError> {
    if state.config.security.enforce_ownership && author_id != account.profile.id {
        tracing::warn!(
            "Profile {} attempted to modify a resource owned by profile {}",
            account.profile.id,
            author_id
        );
        return Err(ApiError::forbidden("author"));
    }
    Ok(())
}
