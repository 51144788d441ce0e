//! Token Service
//!
//! HS256 JWTs carrying the customer identifier and an expiry claim.
//! The signing secret is injected from configuration.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Authorization header scheme: `Authorization: Token <jwt>`
pub const AUTH_SCHEME: &str = "Token ";

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub customer_xid: String,
    /// Expiry as seconds since the Unix epoch
    pub exp: i64,
}

/// Identity gate failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Header Authorization empty")]
    MissingToken,

    #[error("Token signature invalid")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token malformed: {0}")]
    Malformed(String),

    #[error("Token could not be issued: {0}")]
    Signing(String),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies customer tokens
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from the configured secret and lifetime
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a signed token for the customer
    pub fn issue(&self, customer_xid: &str) -> Result<String, AuthError> {
        let claims = Claims {
            customer_xid: customer_xid.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed(e.to_string()),
            }
        })?;

        if data.claims.customer_xid.is_empty() {
            return Err(AuthError::Malformed("empty customer_xid".to_string()));
        }

        Ok(data.claims)
    }

    /// Extract the raw token from an `Authorization` header value
    pub fn token_from_header(value: &str) -> Result<&str, AuthError> {
        let value = value.trim_start();
        let token = value.strip_prefix(AUTH_SCHEME).unwrap_or(value).trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(token)
    }
}
