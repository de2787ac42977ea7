//! User account endpoints
//!
//! # Endpoints
//!
//! - `PUT /v1/users/me/type` - Set marketplace type
//! - `POST /v1/users/me/photo` - Upload profile photo
//! - `DELETE /v1/users/me/photo` - Remove profile photo

use super::{store_image, ImageUpload};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use easel_shared::{
    auth::middleware::AuthContext,
    models::user::{User, UserType},
    storage,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Update user type request
#[derive(Debug, Deserialize)]
pub struct UpdateUserTypeRequest {
    pub user_type: UserType,
}

/// Update user type response
#[derive(Debug, Serialize)]
pub struct UpdateUserTypeResponse {
    pub success: bool,
    pub user_type: UserType,
}

/// Photo upload response
#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub url: String,
}

/// Photo removal response
#[derive(Debug, Serialize)]
pub struct DeletePhotoResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Set the caller's user type
///
/// Any of `client`, `artist`, `both`. Takes effect for policy checks
/// immediately; tokens carry the new type after the next refresh.
///
/// # Errors
///
/// - `404 Not Found`: User not found
/// - `503 Service Unavailable`: No database configured
pub async fn update_user_type(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateUserTypeRequest>,
) -> ApiResult<Json<UpdateUserTypeResponse>> {
    if !User::update_user_type(&state.db, auth.user_id, req.user_type).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %auth.user_id, user_type = req.user_type.as_str(), "User type updated");

    Ok(Json(UpdateUserTypeResponse {
        success: true,
        user_type: req.user_type,
    }))
}

/// Upload a profile photo
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/me/photo
/// Authorization: Bearer <token>
///
/// { "image_data": "data:image/png;base64,iVBORw0...", "mime_type": "image/png" }
/// ```
///
/// # Response
///
/// ```json
/// { "url": "https://cdn.example.com/profile-photos/<user>-<millis>.png" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Undecodable image or bad MIME type
/// - `422 Unprocessable Entity`: Missing fields
/// - `503 Service Unavailable`: No database configured
pub async fn upload_profile_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ImageUpload>,
) -> ApiResult<Json<PhotoResponse>> {
    req.validate()?;

    // Fail before storing anything we could not record
    state.db.writer("update profile photo")?;

    let stored = store_image(&state, &req, |millis, ext| {
        storage::profile_photo_key(auth.user_id, millis, ext)
    })
    .await?;

    let updated = User::update_profile_photo(
        &state.db,
        auth.user_id,
        Some(stored.url.clone()),
        Some(stored.key.clone()),
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %auth.user_id, key = %stored.key, "Profile photo uploaded");

    Ok(Json(PhotoResponse { url: stored.url }))
}

/// Remove the caller's profile photo
///
/// Clears the URL and key on the user. The stored object is left in place.
pub async fn delete_profile_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DeletePhotoResponse>> {
    state.db.writer("remove profile photo")?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if user.profile_photo_key.is_none() {
        return Ok(Json(DeletePhotoResponse {
            success: false,
            message: Some("No profile photo to delete".to_string()),
        }));
    }

    User::update_profile_photo(&state.db, auth.user_id, None, None).await?;

    info!(user_id = %auth.user_id, "Profile photo removed");

    Ok(Json(DeletePhotoResponse {
        success: true,
        message: None,
    }))
}
