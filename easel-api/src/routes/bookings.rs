//! Booking endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/bookings` - Request a booking from an artist
//! - `GET /v1/bookings/mine` - Bookings for the caller (artist or client view)
//! - `POST /v1/bookings/:id/status` - Accept, decline, complete or cancel

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use easel_shared::{
    auth::{
        authorization::{authorize_status_update, booking_view, AuthzError, BookingView},
        middleware::AuthContext,
    },
    models::{
        artist_profile::ArtistProfile,
        booking::{Booking, BookingStatus, CreateBooking},
        user::User,
    },
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Create booking request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// Target artist profile ID (not a user ID)
    pub artist_id: Uuid,

    #[validate(length(min = 1, message = "Service description is required"))]
    pub service_description: String,

    /// Any date; no availability check is made
    pub requested_date: DateTime<Utc>,

    /// Budget in the smallest currency unit
    #[validate(range(min = 1, message = "Budget must be a positive amount"))]
    pub budget: Option<i32>,

    pub notes: Option<String>,
}

/// Update status request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// Request a booking
///
/// Every call inserts a new `pending` booking; there is no deduplication.
///
/// # Endpoint
///
/// ```text
/// POST /v1/bookings
/// Authorization: Bearer <token>
///
/// {
///   "artist_id": "...",
///   "service_description": "Portrait of two cats",
///   "requested_date": "2026-03-01T15:00:00Z",
///   "budget": 5000
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Artist not found
/// - `422 Unprocessable Entity`: Validation failed
/// - `503 Service Unavailable`: No database configured
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    req.validate()?;

    let booking = Booking::create(
        &state.db,
        CreateBooking {
            client_id: auth.user_id,
            artist_id: req.artist_id,
            service_description: req.service_description,
            requested_date: req.requested_date,
            budget: req.budget,
            notes: req.notes.filter(|n| !n.trim().is_empty()),
        },
    )
    .await?;

    info!(
        booking_id = %booking.id,
        client_id = %booking.client_id,
        artist_id = %booking.artist_id,
        "Booking requested"
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Bookings for the caller
///
/// Artists (and `both` users) who own a profile see the bookings addressed
/// to that profile; everyone else sees the bookings they made. The user type
/// is read from the user row, not the token.
pub async fn list_my_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Booking>>> {
    let Some(user) = User::find_by_id(&state.db, auth.user_id).await? else {
        return Ok(Json(Vec::new()));
    };

    let profile_id = if user.user_type.is_provider() {
        ArtistProfile::find_by_user_id(&state.db, user.id)
            .await?
            .map(|profile| profile.id)
    } else {
        None
    };

    let bookings = match booking_view(user.id, user.user_type, profile_id) {
        BookingView::AsArtist(profile_id) => Booking::list_by_artist(&state.db, profile_id).await?,
        BookingView::AsClient(client_id) => Booking::list_by_client(&state.db, client_id).await?,
    };

    debug!(user_id = %user.id, count = bookings.len(), "Listed bookings");

    Ok(Json(bookings))
}

/// Change a booking's status
///
/// Allowed for the booking's client and the owner of its artist profile.
/// `pending` is never a valid target. Under the strict transition policy
/// the move must also follow the booking lifecycle.
///
/// # Endpoint
///
/// ```text
/// POST /v1/bookings/:id/status
/// Authorization: Bearer <token>
///
/// { "status": "accepted" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Target not allowed from the current status
/// - `403 Forbidden`: Caller is not a party to the booking
/// - `404 Not Found`: Booking not found
pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Booking>> {
    let booking = Booking::find_by_id(&state.db, booking_id).await?;

    let caller_profile_id = ArtistProfile::find_by_user_id(&state.db, auth.user_id)
        .await?
        .map(|profile| profile.id);

    let booking = authorize_status_update(
        booking.as_ref(),
        auth.user_id,
        caller_profile_id,
        req.status,
        state.config.bookings.transitions,
    )?;
    let from = booking.status;

    let updated = Booking::update_status(&state.db, booking.id, req.status)
        .await?
        .ok_or(AuthzError::BookingNotFound)?;

    info!(
        booking_id = %updated.id,
        user_id = %auth.user_id,
        from = from.as_str(),
        to = updated.status.as_str(),
        "Booking status updated"
    );

    Ok(Json(updated))
}
