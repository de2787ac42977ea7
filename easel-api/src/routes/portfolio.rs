//! Portfolio endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/portfolio` - Upload an image and append it to the portfolio
//! - `DELETE /v1/portfolio` - Remove an image URL from the portfolio
//!
//! Both act on the caller's own artist profile. Removed images stay in the
//! blob store.

use super::{store_image, ImageUpload};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use easel_shared::{
    auth::middleware::AuthContext,
    models::artist_profile::ArtistProfile,
    storage,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub success: bool,
    pub url: String,
    pub images: Vec<String>,
}

/// Delete image request
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteImageRequest {
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: String,
}

/// Delete image response
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub success: bool,
    pub images: Vec<String>,
}

async fn my_profile(state: &AppState, auth: &AuthContext) -> ApiResult<ArtistProfile> {
    ArtistProfile::find_by_user_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))
}

/// Upload a portfolio image
///
/// # Endpoint
///
/// ```text
/// POST /v1/portfolio
/// Authorization: Bearer <token>
///
/// { "image_data": "iVBORw0...", "mime_type": "image/png" }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "url": "...", "images": ["...", "..."] }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Undecodable image or bad MIME type
/// - `404 Not Found`: Caller has no artist profile
/// - `503 Service Unavailable`: No database configured
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ImageUpload>,
) -> ApiResult<Json<UploadImageResponse>> {
    req.validate()?;

    state.db.writer("update portfolio")?;
    let profile = my_profile(&state, &auth).await?;

    let stored = store_image(&state, &req, |millis, ext| {
        storage::portfolio_key(profile.id, millis, ext)
    })
    .await?;

    let images = ArtistProfile::append_portfolio_image(&state.db, profile.id, &stored.url)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

    info!(
        profile_id = %profile.id,
        key = %stored.key,
        images = images.len(),
        "Portfolio image uploaded"
    );

    Ok(Json(UploadImageResponse {
        success: true,
        url: stored.url,
        images,
    }))
}

/// Remove an image from the portfolio
///
/// Every entry equal to `image_url` is removed. Unknown URLs leave the list
/// unchanged.
///
/// # Errors
///
/// - `404 Not Found`: Caller has no artist profile
/// - `422 Unprocessable Entity`: `image_url` is not a URL
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DeleteImageRequest>,
) -> ApiResult<Json<DeleteImageResponse>> {
    req.validate()?;

    state.db.writer("update portfolio")?;
    let profile = my_profile(&state, &auth).await?;

    let images = ArtistProfile::remove_portfolio_image(&state.db, profile.id, &req.image_url)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

    info!(profile_id = %profile.id, images = images.len(), "Portfolio image removed");

    Ok(Json(DeleteImageResponse {
        success: true,
        images,
    }))
}
