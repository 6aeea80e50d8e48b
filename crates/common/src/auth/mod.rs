//! Authentication utilities
//!
//! Session issuance and password handling live outside this service; a
//! request arrives with a bearer token that encodes the actor's identity
//! and role. This module provides:
//! - JWT token generation and validation
//! - The `AuthContext` available to handlers

use crate::errors::{AppError, Result};
use crate::workflow::Role;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extracted authentication context available to handlers.
///
/// Inserted into request extensions by the gateway's auth middleware
/// after token validation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The acting user
    pub user_id: Uuid,

    /// The actor's canonical role
    pub role: Role,

    /// Request ID for tracing
    pub request_id: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Canonical role name
    pub role: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Generate a new JWT token for a user
    pub fn generate_token(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            role: String::from(role),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal {
                message: format!("Failed to generate token: {}", e),
            })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }

    /// Resolve validated claims into an `AuthContext`
    pub fn context_from_claims(&self, claims: &JwtClaims, request_id: String) -> Result<AuthContext> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
        let role = Role::parse(&claims.role).ok_or(AppError::InvalidToken)?;

        Ok(AuthContext {
            user_id,
            role,
            request_id,
        })
    }
}

/// Extract a bearer token from an Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Axum extractor for AuthContext
///
/// Reads the context inserted by the auth middleware; a missing context
/// means the route was not behind the middleware.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing authentication context".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("abc.def.ghi"), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test_secret", 3600);

        let user_id = Uuid::new_v4();
        let token = manager.generate_token(user_id, Role::Editor).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "editor");

        let ctx = manager
            .context_from_claims(&claims, "req-1".to_string())
            .unwrap();
        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.role, Role::Editor);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let manager = JwtManager::new("test_secret", 3600);
        let err = manager.validate_token("not-a-token").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret_a", 3600);
        let verifier = JwtManager::new("secret_b", 3600);

        let token = issuer.generate_token(Uuid::new_v4(), Role::Writer).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_unknown_role_claim_rejected() {
        let manager = JwtManager::new("test_secret", 3600);
        let claims = JwtClaims {
            sub: Uuid::new_v4().to_string(),
            role: "janitor".to_string(),
            exp: (Utc::now() + Duration::seconds(60)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        assert!(manager.context_from_claims(&claims, "req".into()).is_err());
    }
}
