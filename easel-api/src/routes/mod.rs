//! API route handlers
//!
//! Organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, login, token refresh, current user
//! - `users`: User type and profile photo
//! - `categories`: Service categories
//! - `artists`: Artist profiles and search
//! - `bookings`: Booking requests and status lifecycle
//! - `reviews`: Reviews of completed bookings
//! - `portfolio`: Artist portfolio images

pub mod artists;
pub mod auth;
pub mod bookings;
pub mod categories;
pub mod health;
pub mod portfolio;
pub mod reviews;
pub mod users;

use crate::{app::AppState, error::ApiResult};
use chrono::Utc;
use easel_shared::storage::{self, StoredObject};
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

/// Base64 image upload body shared by photo and portfolio uploads
#[derive(Debug, Deserialize, Validate)]
pub struct ImageUpload {
    /// Base64 image, optionally as a `data:image/...;base64,` URL
    #[validate(length(min = 1, message = "Image data is required"))]
    pub image_data: String,

    /// MIME type such as `image/png`
    #[validate(length(min = 1, message = "MIME type is required"))]
    pub mime_type: String,
}

/// Decodes an upload and puts it in the blob store
///
/// `make_key` receives the current Unix time in milliseconds and the file
/// extension derived from the MIME type.
pub(crate) async fn store_image(
    state: &AppState,
    upload: &ImageUpload,
    make_key: impl FnOnce(i64, &str) -> String,
) -> ApiResult<StoredObject> {
    let extension = storage::file_extension(&upload.mime_type)?;
    let data = storage::decode_image_payload(&upload.image_data)?;
    let key = make_key(Utc::now().timestamp_millis(), &extension);

    debug!(
        key = %key,
        bytes = data.len(),
        backend = state.blobs.name(),
        "Storing image"
    );

    Ok(state.blobs.put(&key, data, &upload.mime_type).await?)
}
