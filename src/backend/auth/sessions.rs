/**
 * Session Management and JWT Tokens
 *
 * This module handles JWT token generation and validation for user sessions.
 * Tokens are HS256-signed with the configured secret and carried in the
 * `token` cookie (or an `Authorization: Bearer` header).
 */

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Signing secret and lifetime of issued tokens
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl: Duration,
}

/// Create a JWT token for a user
pub fn create_token(
    config: &SessionConfig,
    user_id: Uuid,
    email: &str,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        username: Some(username.to_string()),
        exp: (now + config.ttl).timestamp().max(0) as u64,
        iat: now.timestamp().max(0) as u64,
    };

    let key = EncodingKey::from_secret(config.secret.as_bytes());
    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
pub fn verify_token(config: &SessionConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}
