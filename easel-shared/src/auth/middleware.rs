//! Request authentication primitives
//!
//! Extracts the bearer token from a request, validates it, and produces the
//! [`AuthContext`] that the API's auth layers place in request extensions.
//!
//! # Example
//!
//! ```
//! use axum::http::{header, HeaderMap, HeaderValue};
//! use easel_shared::auth::jwt::{create_token, Claims, TokenType};
//! use easel_shared::auth::middleware::authenticate;
//! use easel_shared::models::user::{UserRole, UserType};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "your-secret-key-at-least-32-bytes";
//! let claims = Claims::new(Uuid::new_v4(), UserType::Client, UserRole::User, TokenType::Access);
//! let token = create_token(&claims, secret)?;
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
//!
//! let auth = authenticate(&headers, secret)?;
//! assert_eq!(auth.user_id, claims.sub);
//! # Ok(())
//! # }
//! ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::user::{UserRole, UserType};

/// Authenticated caller, added to request extensions
///
/// `user_type` and `role` are as of token issue. Policies that depend on the
/// current user type re-read the user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Marketplace type from the token
    pub user_type: UserType,

    /// Platform role from the token
    pub role: UserRole,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            user_type: claims.user_type,
            role: claims.role,
        }
    }

    /// Whether the caller is a platform administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::WrongTokenType { .. } => {
                AuthError::InvalidToken("Expected access token".to_string())
            }
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

/// Extracts the bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// Missing header, malformed header, or an invalid/expired/refresh token
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_access_token(token, secret)?;
    Ok(AuthContext::from_claims(&claims))
}

/// Authenticates a request if it carries a valid access token
///
/// Used by public routes that answer differently for signed-in callers.
pub fn authenticate_optional(headers: &HeaderMap, secret: &str) -> Option<AuthContext> {
    authenticate(headers, secret).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "middleware-test-secret-at-least-32-bytes";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn token(token_type: TokenType) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, UserType::Artist, UserRole::User, token_type);
        (user_id, create_token(&claims, SECRET).unwrap())
    }

    #[test]
    fn test_authenticate_valid_access_token() {
        let (user_id, token) = token(TokenType::Access);
        let auth = authenticate(&headers_with(&format!("Bearer {token}")), SECRET).unwrap();

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.user_type, UserType::Artist);
        assert!(!auth.is_admin());
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        assert!(matches!(
            authenticate(&HeaderMap::new(), SECRET),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            authenticate(&headers_with("Basic abc"), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            authenticate(&headers_with("Bearer "), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_refresh_token_not_accepted_for_requests() {
        let (_, token) = token(TokenType::Refresh);
        assert!(matches!(
            authenticate(&headers_with(&format!("Bearer {token}")), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_optional_authentication() {
        let (user_id, token) = token(TokenType::Access);
        let headers = headers_with(&format!("Bearer {token}"));

        assert_eq!(
            authenticate_optional(&headers, SECRET).map(|a| a.user_id),
            Some(user_id)
        );
        assert!(authenticate_optional(&HeaderMap::new(), SECRET).is_none());
        assert!(authenticate_optional(&headers_with("Bearer junk"), SECRET).is_none());
    }
}
