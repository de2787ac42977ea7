//! Review endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/reviews` - Review a completed booking (its client only)
//! - `GET /v1/reviews/artist/:artist_id` - Reviews of an artist (public)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use easel_shared::{
    auth::{
        authorization::{authorize_review, AuthzError},
        middleware::AuthContext,
    },
    models::{
        booking::Booking,
        review::{CreateReview, Review},
    },
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Create review request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,

    /// Optional; must match the booking's artist when given
    pub artist_id: Option<Uuid>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Review a completed booking
///
/// Checks, in order: the booking exists (404), the caller is its client
/// (403), it is completed (400). Client and artist on the review are taken
/// from the booking.
///
/// # Endpoint
///
/// ```text
/// POST /v1/reviews
/// Authorization: Bearer <token>
///
/// { "booking_id": "...", "rating": 5, "comment": "Wonderful" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Booking not completed, or artist mismatch
/// - `403 Forbidden`: Caller is not the booking's client
/// - `404 Not Found`: Booking not found
/// - `409 Conflict`: This booking has already been reviewed
/// - `422 Unprocessable Entity`: Rating out of range
pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    req.validate()?;

    let booking = Booking::find_by_id(&state.db, req.booking_id).await?;
    let booking = authorize_review(booking.as_ref(), auth.user_id, req.artist_id)?;

    let review = Review::create(
        &state.db,
        CreateReview {
            booking_id: booking.id,
            client_id: auth.user_id,
            rating: req.rating,
            comment: req.comment.filter(|c| !c.trim().is_empty()),
        },
    )
    .await?
    // Status or ownership changed after the gate read
    .ok_or(AuthzError::NotCompleted)?;

    info!(
        review_id = %review.id,
        booking_id = %review.booking_id,
        artist_id = %review.artist_id,
        rating = review.rating,
        "Review created"
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// Reviews of an artist profile, newest first
pub async fn list_artist_reviews(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(Review::list_by_artist(&state.db, artist_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn request(rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            booking_id: Uuid::new_v4(),
            artist_id: None,
            rating,
            comment: None,
        }
    }

    #[test]
    fn test_rating_range() {
        assert!(request(1).validate().is_ok());
        assert!(request(5).validate().is_ok());

        for rating in [0, 6, -1] {
            let err = ApiError::from(request(rating).validate().unwrap_err());
            match err {
                ApiError::ValidationError(details) => {
                    assert_eq!(details.len(), 1);
                    assert_eq!(details[0].field, "rating");
                    assert_eq!(details[0].message, "Rating must be between 1 and 5");
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }
}
