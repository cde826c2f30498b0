use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::handlers::{self, articles, comments, favorites, profiles, tags, users};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Build the complete application: routes, auth, tracing and CORS.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .route("/api/health", get(handlers::health))
        .merge(user_routes())
        .merge(article_routes())
        .merge(profile_routes())
        .merge(tag_routes())
        // Only runs for matched routes, so unknown paths still reach the fallback
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        .fallback(handlers::not_found)
        .with_state(state);

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config));
    }
    router
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/user", get(users::current).put(users::update))
}

fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles", get(articles::list).post(articles::create))
        .route("/api/articles/feed", get(articles::feed))
        .route(
            "/api/articles/:slug",
            get(articles::get).put(articles::update).delete(articles::delete),
        )
        .route(
            "/api/articles/:slug/favorite",
            post(favorites::toggle).delete(favorites::toggle),
        )
        .route(
            "/api/articles/:slug/comments",
            get(comments::list).post(comments::add),
        )
        .route(
            "/api/articles/:slug/comments/:id",
            axum::routing::delete(comments::delete),
        )
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profiles/:username", get(profiles::get))
        .route(
            "/api/profiles/:username/follow",
            post(profiles::toggle_follow).delete(profiles::toggle_follow),
        )
}

fn tag_routes() -> Router<AppState> {
    Router::new().route("/api/tags", get(tags::list))
}

/// Permissive in development, restricted to the configured origins elsewhere
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::testing::memory_database;

    async fn test_app() -> Router {
        let db = memory_database().await;
        app(AppState::new(db, AppConfig::testing()))
    }

    async fn send(app: Router, method: Method, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            request = request.header("Authorization", auth);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = send(test_app().await, Method::GET, "/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "errors": { "Route": "is invalid" } }));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(test_app().await, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn required_routes_reject_missing_header() {
        let (status, body) = send(test_app().await, Method::GET, "/api/user", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "errors": { "Authorization Header": "is invalid" } }));
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let (status, body) = send(test_app().await, Method::GET, "/api/user", Some("Token garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "errors": { "JWT Token": "is invalid" } }));
    }

    #[tokio::test]
    async fn optional_routes_allow_anonymous_viewers() {
        let (status, body) = send(test_app().await, Method::GET, "/api/articles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "articles": [], "articlesCount": 0 }));
    }
}
