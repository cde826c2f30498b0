// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;

/// HTTP API error. Every variant carries the name of the offending field,
/// rendered as `{"errors": {<field>: "is invalid"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Name of the field reported back to the client
    pub fn field(&self) -> &str {
        match self {
            ApiError::BadRequest(field) => field,
            ApiError::Unauthorized(field) => field,
            ApiError::Forbidden(field) => field,
            ApiError::NotFound(field) => field,
            ApiError::InternalServerError(field) => field,
            ApiError::ServiceUnavailable(field) => field,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut errors = serde_json::Map::new();
        errors.insert(self.field().to_string(), json!("is invalid"));
        json!({ "errors": errors })
    }
}

impl ApiError {
    pub fn bad_request(field: impl Into<String>) -> Self {
        ApiError::BadRequest(field.into())
    }

    pub fn unauthorized(field: impl Into<String>) -> Self {
        ApiError::Unauthorized(field.into())
    }

    pub fn forbidden(field: impl Into<String>) -> Self {
        ApiError::Forbidden(field.into())
    }

    pub fn not_found(field: impl Into<String>) -> Self {
        ApiError::NotFound(field.into())
    }

    pub fn internal_server_error(field: impl Into<String>) -> Self {
        ApiError::InternalServerError(field.into())
    }

    pub fn service_unavailable(field: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(field.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(msg) => {
                tracing::debug!("Rejected duplicate value: {}", msg);
                ApiError::bad_request("Parameter")
            }
            DatabaseError::InvalidDatabaseUrl(_) | DatabaseError::MigrationError(_) => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::service_unavailable("Database")
            }
            DatabaseError::Sqlx(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_),
            ) => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::service_unavailable("Database")
            }
            // Don't expose internal SQL errors to clients
            DatabaseError::Sqlx(_) | DatabaseError::MissingAssociation(_) => {
                tracing::error!("Database error: {}", err);
                ApiError::bad_request("Parameter")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingHeader => ApiError::unauthorized("Authorization Header"),
            AuthError::InvalidToken(_) => ApiError::unauthorized("JWT Token"),
            AuthError::UnknownUser => ApiError::unauthorized("User data"),
            AuthError::InvalidCredentials => ApiError::forbidden("email or password"),
            AuthError::Signing(_) | AuthError::Hashing(_) => {
                tracing::error!("Credential processing failed: {}", err);
                ApiError::internal_server_error("Server")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} is invalid", self.status_code().as_u16(), self.field())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_uniform_error_body() {
        let err = ApiError::forbidden("email or password");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_json(), json!({ "errors": { "email or password": "is invalid" } }));
    }

    #[test]
    fn maps_auth_failures_to_status_and_field() {
        let cases = [
            (AuthError::MissingHeader, StatusCode::UNAUTHORIZED, "Authorization Header"),
            (AuthError::InvalidToken("expired".into()), StatusCode::UNAUTHORIZED, "JWT Token"),
            (AuthError::UnknownUser, StatusCode::UNAUTHORIZED, "User data"),
            (AuthError::InvalidCredentials, StatusCode::FORBIDDEN, "email or password"),
            (AuthError::Signing("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "Server"),
        ];

        for (auth_err, status, field) in cases {
            let api_err = ApiError::from(auth_err);
            assert_eq!(api_err.status_code(), status);
            assert_eq!(api_err.field(), field);
        }
    }

    #[test]
    fn unique_violation_is_generic_bad_request() {
        let err = ApiError::from(DatabaseError::UniqueViolation("profiles.name".into()));
        assert_eq!(err, ApiError::bad_request("Parameter"));
    }
}
