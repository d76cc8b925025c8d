pub mod ownership;
pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::types::Role;

pub use ownership::{authorize, check, Access, OwnedResource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, expiry_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: user_id,
            exp: (now + Duration::days(expiry_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_token(user_id: i64, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user_id, security.jwt_expiry_days);
    let key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn verify_token(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Authenticated caller, resolved from the bearer token and the users table
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_days: 30,
            admin_email: None,
            cors_origins: vec![],
        }
    }

    #[test]
    fn token_round_trip_carries_user_id() {
        let token = generate_token(42, &security("s3cret")).unwrap();
        let claims = verify_token(&token, &security("s3cret")).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(42, &security("one")).unwrap();
        assert!(matches!(verify_token(&token, &security("two")), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_cannot_issue() {
        assert!(matches!(generate_token(1, &security("")), Err(JwtError::InvalidSecret)));
    }
}
