/**
 * Session Resolution and JWT Tokens
 *
 * This module turns an incoming request into the authenticated caller.
 * Handlers depend on the [`SessionResolver`] trait only; the shipped
 * implementation verifies HS256 JWTs carried in the `Authorization` header.
 *
 * Token issuance lives with the identity provider; [`create_token`] exists
 * so tests and operator tooling can mint tokens with the same secret.
 */

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default lifetime of tokens minted by [`create_token`]
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// The authenticated user of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
}

/// A resolved session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
}

impl Session {
    pub fn for_user(id: impl Into<String>) -> Self {
        Self {
            user: SessionUser { id: id.into() },
        }
    }
}

/// Resolves the caller of a request, if any
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Resolves sessions from `Authorization: Bearer <jwt>` headers
pub struct JwtSessionResolver {
    secret: String,
}

impl JwtSessionResolver {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Session> {
        let token = bearer_token(headers)?;

        match verify_token(token, &self.secret) {
            Ok(claims) if !claims.sub.is_empty() => Some(Session::for_user(claims.sub)),
            Ok(_) => {
                tracing::warn!("[Auth] Token without subject");
                None
            }
            Err(e) => {
                tracing::warn!("[Auth] Invalid token: {}", e);
                None
            }
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `user_id` - User ID, stored as the `sub` claim
/// * `secret` - HS256 signing secret
/// * `ttl_secs` - Lifetime in seconds
pub fn create_token(
    user_id: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp().max(0) as u64;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + ttl_secs,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
