//! Access token verification.
//!
//! Tokens are HS256 JWTs carrying the player id (`sub`) and display name.
//! Issuing tokens belongs to the identity provider; [`TokenVerifier::issue`]
//! exists for tooling and tests that share the secret.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Player id
    pub sub: String,
    /// Display name
    pub name: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication token missing")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            AuthError::MissingToken => "Access denied: no token provided".to_string(),
            AuthError::TokenExpired => "Access denied: token expired".to_string(),
            AuthError::InvalidToken(_) => "Access denied: invalid token".to_string(),
            AuthError::Signing(_) => "Internal server error".to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}

/// Verifies (and for tooling, issues) HS256 access tokens
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify a token's signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }

    /// Sign a token for `player_id` valid for `ttl`
    pub fn issue(&self, player_id: &str, name: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: player_id.to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}
