//! Booking and review authorization policy
//!
//! Pure checks over already-loaded rows. Handlers load the booking (and the
//! caller's artist profile where needed) and pass them in, so every rule
//! here is testable without a database.
//!
//! # Rules
//!
//! - A booking's status may be changed only by its client or by the owner of
//!   the artist profile it targets. Nothing moves a booking back to pending.
//!   Under [`TransitionPolicy::Strict`] the move must also follow
//!   [`BookingStatus::can_transition_to`].
//! - A review requires, in order: the booking exists, the caller is its
//!   client, the booking is completed.
//! - "My bookings" shows the artist-side view when the caller is an artist
//!   (or both) *and* owns a profile; otherwise the client-side view.
//!
//! # Example
//!
//! ```
//! use easel_shared::auth::authorization::{booking_view, BookingView};
//! use easel_shared::models::user::UserType;
//! use uuid::Uuid;
//!
//! let user_id = Uuid::new_v4();
//!
//! // A "both" user without a profile falls through to the client view
//! assert_eq!(booking_view(user_id, UserType::Both, None), BookingView::AsClient(user_id));
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::user::UserType;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Booking does not exist
    #[error("Booking not found")]
    BookingNotFound,

    /// Caller is neither the client nor the artist of the booking
    #[error("Not authorized to update this booking")]
    NotBookingParty,

    /// Caller is not the client of the booking
    #[error("Only the client can review this booking")]
    NotBookingClient,

    /// Booking is not completed
    #[error("Can only review completed bookings")]
    NotCompleted,

    /// Status updates cannot target pending
    #[error("Bookings cannot be moved back to pending")]
    PendingTarget,

    /// Strict policy rejected the move
    #[error("Cannot move a booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Supplied artist does not match the booking's artist
    #[error("Artist does not match the booking")]
    ArtistMismatch,

    /// Caller is not an administrator
    #[error("Administrator role required")]
    AdminRequired,
}

impl AuthzError {
    /// Whether this is an authorization failure (as opposed to not-found or
    /// an invalid request)
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            AuthzError::NotBookingParty | AuthzError::NotBookingClient | AuthzError::AdminRequired
        )
    }
}

/// How strictly status updates follow the booking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any non-pending target from any status, once authorized
    #[default]
    Permissive,

    /// Only moves allowed by [`BookingStatus::can_transition_to`]
    Strict,
}

impl TransitionPolicy {
    /// Whether a move from `from` to `to` is allowed
    pub fn allows(&self, from: BookingStatus, to: BookingStatus) -> bool {
        if !to.is_update_target() {
            return false;
        }
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => from.can_transition_to(to),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(format!(
                "Unknown booking transition policy '{}' (expected permissive or strict)",
                other
            )),
        }
    }
}

/// Which bookings "my bookings" returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingView {
    /// Bookings targeting this artist profile
    AsArtist(Uuid),

    /// Bookings made by this user
    AsClient(Uuid),
}

/// Chooses the booking view for a caller
///
/// One branch at a time: a provider with a profile sees only the bookings
/// addressed to that profile, never their own client-side requests.
pub fn booking_view(user_id: Uuid, user_type: UserType, profile_id: Option<Uuid>) -> BookingView {
    match profile_id {
        Some(profile_id) if user_type.is_provider() => BookingView::AsArtist(profile_id),
        _ => BookingView::AsClient(user_id),
    }
}

/// Checks that the caller is the booking's client or its artist
pub fn require_booking_party(
    booking: &Booking,
    caller_id: Uuid,
    caller_profile_id: Option<Uuid>,
) -> Result<(), AuthzError> {
    let is_client = booking.client_id == caller_id;
    let is_artist = caller_profile_id == Some(booking.artist_id);

    if is_client || is_artist {
        Ok(())
    } else {
        Err(AuthzError::NotBookingParty)
    }
}

/// Full gate for a status update
///
/// Checks, in order: the booking exists, the caller is a party, the target
/// is allowed by `policy`.
pub fn authorize_status_update<'a>(
    booking: Option<&'a Booking>,
    caller_id: Uuid,
    caller_profile_id: Option<Uuid>,
    target: BookingStatus,
    policy: TransitionPolicy,
) -> Result<&'a Booking, AuthzError> {
    let booking = booking.ok_or(AuthzError::BookingNotFound)?;

    require_booking_party(booking, caller_id, caller_profile_id)?;

    if !target.is_update_target() {
        return Err(AuthzError::PendingTarget);
    }

    if !policy.allows(booking.status, target) {
        return Err(AuthzError::InvalidTransition {
            from: booking.status,
            to: target,
        });
    }

    Ok(booking)
}

/// Full gate for creating a review
///
/// Checks, in order: the booking exists, the caller is its client, it is
/// completed, and (when supplied) the artist matches the booking's artist.
pub fn authorize_review<'a>(
    booking: Option<&'a Booking>,
    caller_id: Uuid,
    supplied_artist_id: Option<Uuid>,
) -> Result<&'a Booking, AuthzError> {
    let booking = booking.ok_or(AuthzError::BookingNotFound)?;

    if booking.client_id != caller_id {
        return Err(AuthzError::NotBookingClient);
    }

    if booking.status != BookingStatus::Completed {
        return Err(AuthzError::NotCompleted);
    }

    if let Some(artist_id) = supplied_artist_id {
        if artist_id != booking.artist_id {
            return Err(AuthzError::ArtistMismatch);
        }
    }

    Ok(booking)
}

/// Checks that the caller is an administrator
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}
