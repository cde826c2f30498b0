use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub mod password;

pub use password::PasswordHasher;

/// Claims carried by every identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the `users` row the token was issued for
    pub id: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token does not resolve to a user")]
    UnknownUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Token lifetime used when the configured one is out of range
const FALLBACK_EXPIRY_HOURS: i64 = 24;

/// Issues and validates HS256-signed, time-limited identity tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let ttl = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Token expiry of {} hours is out of range, using {}",
                    expiry_hours,
                    FALLBACK_EXPIRY_HOURS
                );
                Duration::hours(FALLBACK_EXPIRY_HOURS)
            });

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiry_hours)
    }

    /// Sign a token for `user_id` that expires one TTL from now
    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            id: user_id,
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Error while signing JWT: {}", e);
            AuthError::Signing(e.to_string())
        })
    }

    /// Verify signature and expiry, returning the typed claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
