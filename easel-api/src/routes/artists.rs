//! Artist profile endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/artists` - Become an artist (create own profile)
//! - `GET /v1/artists/me` - Own profile, or `null`
//! - `PATCH /v1/artists/me` - Partial update of own profile
//! - `GET /v1/artists` - All profiles, newest first (public)
//! - `GET /v1/artists/search` - Filtered search (public)
//! - `GET /v1/artists/:id` - One profile with its rating (public)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use easel_shared::{
    auth::middleware::AuthContext,
    models::{
        artist_profile::{ArtistProfile, ArtistSearch, CreateArtistProfile, UpdateArtistProfile},
        review::{RatingSummary, Review},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Create artist profile request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArtistRequest {
    #[validate(length(min = 1, max = 255, message = "Display name must be 1-255 characters"))]
    pub display_name: String,

    pub bio: Option<String>,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    #[serde(default)]
    pub category_ids: Vec<Uuid>,

    /// Hourly rate in cents; `0` means unset
    #[validate(range(min = 0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate: Option<i32>,
}

/// Update artist profile request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateArtistRequest {
    #[validate(length(min = 1, max = 255, message = "Display name must be 1-255 characters"))]
    pub display_name: Option<String>,

    pub bio: Option<String>,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    pub category_ids: Option<Vec<Uuid>>,

    #[validate(range(min = 0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate: Option<i32>,

    pub portfolio_images: Option<Vec<String>>,

    pub is_available: Option<bool>,
}

impl From<UpdateArtistRequest> for UpdateArtistProfile {
    fn from(req: UpdateArtistRequest) -> Self {
        Self {
            display_name: req.display_name,
            bio: req.bio,
            location: req.location,
            category_ids: req.category_ids,
            hourly_rate: req.hourly_rate,
            portfolio_images: req.portfolio_images,
            is_available: req.is_available,
        }
    }
}

/// Search query parameters
///
/// `category` is taken as a string so that an empty value means "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub search_term: Option<String>,
}

impl SearchQuery {
    /// Converts to model filters
    ///
    /// # Errors
    ///
    /// `422` if `category` is present, non-empty and not a UUID
    pub fn into_search(self) -> ApiResult<ArtistSearch> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| ApiError::invalid_field("category", "Invalid category id"))?,
            ),
        };

        Ok(ArtistSearch {
            category,
            location: self.location,
            search_term: self.search_term,
        })
    }
}

/// Artist profile with its rating
#[derive(Debug, Serialize)]
pub struct ArtistWithRating {
    #[serde(flatten)]
    pub profile: ArtistProfile,

    pub rating: RatingSummary,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Become an artist
///
/// Creates the caller's profile (available, empty portfolio). A `client`
/// caller becomes `artist`; `artist` and `both` are left as they are.
///
/// # Endpoint
///
/// ```text
/// POST /v1/artists
/// Authorization: Bearer <token>
///
/// {
///   "display_name": "Ada Paints",
///   "bio": "Oil portraits",
///   "location": "Lisbon",
///   "category_ids": ["..."],
///   "hourly_rate": 4500
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: User not found
/// - `409 Conflict`: Artist profile already exists
/// - `422 Unprocessable Entity`: Validation failed
/// - `503 Service Unavailable`: No database configured
pub async fn create_artist_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateArtistRequest>,
) -> ApiResult<(StatusCode, Json<ArtistProfile>)> {
    req.validate()?;

    state.db.writer("create artist profile")?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let profile = ArtistProfile::create(
        &state.db,
        CreateArtistProfile {
            user_id: user.id,
            display_name: req.display_name.trim().to_string(),
            bio: blank_to_none(req.bio),
            location: blank_to_none(req.location),
            category_ids: req.category_ids,
            hourly_rate: req.hourly_rate.filter(|rate| *rate > 0),
        },
    )
    .await?;

    let user_type = user.user_type.after_becoming_artist();
    if user_type != user.user_type {
        User::update_user_type(&state.db, user.id, user_type).await?;
    }

    info!(
        user_id = %user.id,
        profile_id = %profile.id,
        user_type = user_type.as_str(),
        "Artist profile created"
    );

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Caller's own profile, or `null`
pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Option<ArtistProfile>>> {
    Ok(Json(
        ArtistProfile::find_by_user_id(&state.db, auth.user_id).await?,
    ))
}

/// Partially update the caller's profile
///
/// # Errors
///
/// - `404 Not Found`: Artist profile not found
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_my_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateArtistRequest>,
) -> ApiResult<Json<ArtistProfile>> {
    req.validate()?;

    state.db.writer("update artist profile")?;

    let profile = ArtistProfile::find_by_user_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

    let update = UpdateArtistProfile::from(req);
    if update.is_empty() {
        return Ok(Json(profile));
    }

    let updated = ArtistProfile::update(&state.db, profile.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

    info!(profile_id = %updated.id, "Artist profile updated");

    Ok(Json(updated))
}

/// Get an artist profile with its average rating
///
/// # Response
///
/// The profile fields plus `"rating": {"average": 4.5, "count": 2}`;
/// `{0, 0}` when the artist has no reviews.
///
/// # Errors
///
/// - `404 Not Found`: Artist not found
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ArtistWithRating>> {
    let profile = ArtistProfile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))?;

    let rating = Review::average_rating(&state.db, profile.id)
        .await?
        .unwrap_or_default();

    Ok(Json(ArtistWithRating { profile, rating }))
}

/// Search available artists
///
/// # Endpoint
///
/// ```text
/// GET /v1/artists/search?category=<uuid>&location=lis&search_term=portrait
/// ```
///
/// All filters are optional and combined with AND; newest first.
pub async fn search_artists(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ArtistProfile>>> {
    let search = query.into_search()?;
    Ok(Json(ArtistProfile::search(&state.db, &search).await?))
}

/// List all artists, newest first, regardless of availability
pub async fn list_artists(State(state): State<AppState>) -> ApiResult<Json<Vec<ArtistProfile>>> {
    Ok(Json(ArtistProfile::list_all(&state.db).await?))
}
