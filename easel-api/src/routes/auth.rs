//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/auth/register` - Register and get tokens
//! - `POST /v1/auth/login` - Login and get tokens
//! - `POST /v1/auth/refresh` - Exchange a refresh token for an access token
//! - `GET /v1/auth/me` - Current user, or `null` when not signed in
//! - `POST /v1/auth/logout` - End the session (client discards tokens)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use easel_shared::{
    auth::{
        jwt::{self, TokenPair, TokenType},
        middleware::{authenticate_optional, AuthContext},
        password,
    },
    models::user::{CreateUser, User, UserRole},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also checked for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Register/login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The signed-in user
    pub user: User,

    /// Access and refresh tokens
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Plain success acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Register a new user
///
/// New users are clients with the `user` role, except the configured owner
/// email which gets `admin`.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "painter@example.com",
///   "password": "brushes-2024",
///   "name": "Ada"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the user and both tokens.
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
/// - `503 Service Unavailable`: No database configured
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    let email = normalize_email(&req.email);
    let role = if state.config.is_owner_email(&email) {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email,
            password_hash,
            name: req.name.filter(|n| !n.trim().is_empty()),
            role,
        },
    )
    .await?;

    let tokens = jwt::issue_token_pair(&user, state.jwt_secret())?;

    info!(user_id = %user.id, role = user.role.as_str(), "User registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { user, tokens })))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// { "email": "painter@example.com", "password": "brushes-2024" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "Failed login attempt");
        return Err(invalid());
    }

    User::touch_last_signed_in(&state.db, user.id).await?;

    let tokens = jwt::issue_token_pair(&user, state.jwt_secret())?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse { user, tokens }))
}

/// Refresh access token
///
/// The new access token reflects the user's *current* type and role.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid/expired refresh token, or the user is gone
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    let access_claims = jwt::Claims::for_user(&user, TokenType::Access);
    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        access_token,
        expires_in: TokenType::Access.default_expiration().num_seconds(),
    }))
}

/// Current user
///
/// Public: answers `null` when there is no valid access token.
///
/// # Endpoint
///
/// ```text
/// GET /v1/auth/me
/// Authorization: Bearer <access token>   (optional)
/// ```
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Option<User>>> {
    let Some(auth) = authenticate_optional(&headers, state.jwt_secret()) else {
        return Ok(Json(None));
    };

    let user = User::find_by_id(&state.db, auth.user_id).await?;

    Ok(Json(user))
}

/// Logout
///
/// Tokens are stateless; the client discards them.
pub async fn logout(Extension(auth): Extension<AuthContext>) -> Json<SuccessResponse> {
    info!(user_id = %auth.user_id, "User logged out");
    Json(SuccessResponse { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: None,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
