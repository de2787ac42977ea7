//! Database models for Easel
//!
//! Each model owns its queries as associated functions taking a
//! [`Database`](crate::db::Database) handle.
//!
//! # Models
//!
//! - `user`: Accounts, marketplace type and role
//! - `artist_profile`: Provider profiles, search
//! - `category`: Seeded service categories
//! - `booking`: Booking requests and their status lifecycle
//! - `review`: One review per completed booking, artist ratings
//!
//! # Example
//!
//! ```no_run
//! use easel_shared::db::Database;
//! use easel_shared::models::booking::{Booking, BookingStatus};
//! use uuid::Uuid;
//!
//! # async fn example(db: Database, booking_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! if let Some(booking) = Booking::find_by_id(&db, booking_id).await? {
//!     if booking.status == BookingStatus::Pending {
//!         Booking::update_status(&db, booking.id, BookingStatus::Accepted).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod artist_profile;
pub mod booking;
pub mod category;
pub mod review;
pub mod user;
