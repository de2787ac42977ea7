//! Booking model and database operations
//!
//! A booking is a client's request for an artist's time. It references the
//! requesting user (`client_id`) and the artist *profile* (`artist_id`), and
//! only ever changes through a status update.
//!
//! # Lifecycle
//!
//! ```text
//! pending ──► accepted ──► completed
//!    │            │
//!    ├──► declined └──► cancelled
//!    └──► cancelled
//! ```
//!
//! The diagram is the strict machine from [`BookingStatus::can_transition_to`].
//! Whether it is enforced is a policy decision made by the caller (see
//! `auth::authorization::TransitionPolicy`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::error::StoreError;

/// Booking status
///
/// Stored as the `booking_status` Postgres enum, so no other value can be
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting the artist's response
    Pending,

    /// Artist accepted
    Accepted,

    /// Artist declined
    Declined,

    /// Service delivered; reviews are allowed
    Completed,

    /// Withdrawn by either party
    Cancelled,
}

impl BookingStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Accepted,
        BookingStatus::Declined,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    /// Converts status to string
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Declined => "declined",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Checks if status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Declined | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }

    /// Whether a status update may target this status
    ///
    /// Nothing moves a booking back to pending.
    pub fn is_update_target(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    /// Checks if transition to target status is valid under the strict machine
    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        match (self, target) {
            // Pending can be answered by the artist or withdrawn
            (BookingStatus::Pending, BookingStatus::Accepted) => true,
            (BookingStatus::Pending, BookingStatus::Declined) => true,
            (BookingStatus::Pending, BookingStatus::Cancelled) => true,

            // Accepted can be delivered or withdrawn
            (BookingStatus::Accepted, BookingStatus::Completed) => true,
            (BookingStatus::Accepted, BookingStatus::Cancelled) => true,

            // Terminal states cannot transition
            _ => false,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    /// Unique booking ID
    pub id: Uuid,

    /// Requesting user
    pub client_id: Uuid,

    /// Target artist profile (not a user ID)
    pub artist_id: Uuid,

    /// What the client is asking for
    pub service_description: String,

    /// Requested date and time
    pub requested_date: DateTime<Utc>,

    /// Current status
    pub status: BookingStatus,

    /// Budget in the smallest currency unit
    pub budget: Option<i32>,

    /// Free-text notes
    pub notes: Option<String>,

    /// When the booking was created
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a booking
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub client_id: Uuid,
    pub artist_id: Uuid,
    pub service_description: String,
    pub requested_date: DateTime<Utc>,
    pub budget: Option<i32>,
    pub notes: Option<String>,
}

const BOOKING_COLUMNS: &str = "id, client_id, artist_id, service_description, requested_date, \
     status, budget, notes, created_at, updated_at";

impl Booking {
    /// Creates a booking in `pending` status
    ///
    /// No availability or duplicate check is made; every call inserts a new row.
    ///
    /// # Errors
    ///
    /// Foreign-key violation on `bookings_artist_id_fkey` if the artist
    /// profile does not exist
    pub async fn create(db: &Database, data: CreateBooking) -> Result<Self, StoreError> {
        let pool = db.writer("create booking")?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (client_id, artist_id, service_description, requested_date, status, budget, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(data.client_id)
        .bind(data.artist_id)
        .bind(data.service_description)
        .bind(data.requested_date)
        .bind(BookingStatus::Pending)
        .bind(data.budget)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(booking)
    }

    /// Finds a booking by ID
    pub async fn find_by_id(db: &Database, id: Uuid) -> Result<Option<Self>, StoreError> {
        let Some(pool) = db.reader("get booking") else {
            return Ok(None);
        };

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }

    /// Lists bookings made by a client, newest first
    pub async fn list_by_client(db: &Database, client_id: Uuid) -> Result<Vec<Self>, StoreError> {
        let Some(pool) = db.reader("list bookings") else {
            return Ok(Vec::new());
        };

        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE client_id = $1 ORDER BY created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Lists bookings targeting an artist profile, newest first
    pub async fn list_by_artist(db: &Database, artist_id: Uuid) -> Result<Vec<Self>, StoreError> {
        let Some(pool) = db.reader("list bookings") else {
            return Ok(Vec::new());
        };

        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE artist_id = $1 ORDER BY created_at DESC"
        ))
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Sets the booking status and refreshes `updated_at`
    ///
    /// Concurrent updates are last-write-wins. Returns `None` if the booking
    /// doesn't exist.
    pub async fn update_status(
        db: &Database,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Self>, StoreError> {
        let pool = db.writer("update booking status")?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_as_str() {
        assert_eq!(BookingStatus::Pending.as_str(), "pending");
        assert_eq!(BookingStatus::Accepted.as_str(), "accepted");
        assert_eq!(BookingStatus::Declined.as_str(), "declined");
        assert_eq!(BookingStatus::Completed.as_str(), "completed");
        assert_eq!(BookingStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_booking_status_is_terminal() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Accepted.is_terminal());
        assert!(BookingStatus::Declined.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_pending_is_never_an_update_target() {
        let targets: Vec<_> = BookingStatus::ALL
            .iter()
            .filter(|s| s.is_update_target())
            .collect();
        assert_eq!(targets.len(), 4);
        assert!(!targets.contains(&&BookingStatus::Pending));
    }

    #[test]
    fn test_booking_status_transitions() {
        // Pending transitions
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Accepted));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Declined));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));

        // Accepted transitions
        assert!(BookingStatus::Accepted.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Accepted.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Accepted.can_transition_to(BookingStatus::Declined));

        // Terminal states cannot transition
        for from in BookingStatus::ALL.iter().filter(|s| s.is_terminal()) {
            for to in BookingStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_booking_status_serde_rejects_unknown() {
        let parsed: BookingStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, BookingStatus::Completed);
        assert!(serde_json::from_str::<BookingStatus>("\"archived\"").is_err());
    }

    #[tokio::test]
    async fn test_booking_queries_without_database() {
        let db = Database::unavailable();
        assert!(Booking::find_by_id(&db, Uuid::new_v4()).await.unwrap().is_none());
        assert!(Booking::list_by_client(&db, Uuid::new_v4()).await.unwrap().is_empty());
        assert!(matches!(
            Booking::update_status(&db, Uuid::new_v4(), BookingStatus::Accepted).await,
            Err(StoreError::Unavailable)
        ));
    }
}
