//! Review model
//!
//! One review per booking (`reviews_booking_id_key`). Reviews are immutable.
//! `client_id` and `artist_id` are copied from the parent booking inside the
//! insert, so they always match it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::error::StoreError;

/// Review of a completed booking
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub client_id: Uuid,
    pub artist_id: Uuid,

    /// 1 to 5 inclusive
    pub rating: i32,

    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub booking_id: Uuid,

    /// Reviewing user; must be the booking's client
    pub client_id: Uuid,

    pub rating: i32,
    pub comment: Option<String>,
}

/// Average rating of an artist profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self {
            average: 0.0,
            count: 0,
        }
    }
}

impl Review {
    /// Creates a review, deriving client and artist from the booking
    ///
    /// The insert happens only if the booking exists, is completed and
    /// belongs to `client_id` at the time of the write. Returns `None`
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Unique violation on `reviews_booking_id_key` when the booking was
    /// already reviewed
    pub async fn create(db: &Database, data: CreateReview) -> Result<Option<Self>, StoreError> {
        let pool = db.writer("create review")?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (booking_id, client_id, artist_id, rating, comment)
            SELECT b.id, b.client_id, b.artist_id, $2, $3
            FROM bookings b
            WHERE b.id = $1
              AND b.status = 'completed'
              AND b.client_id = $4
            RETURNING id, booking_id, client_id, artist_id, rating, comment, created_at
            "#,
        )
        .bind(data.booking_id)
        .bind(data.rating)
        .bind(data.comment)
        .bind(data.client_id)
        .fetch_optional(pool)
        .await?;

        Ok(review)
    }

    /// Lists reviews of an artist profile, newest first
    pub async fn list_by_artist(db: &Database, artist_id: Uuid) -> Result<Vec<Self>, StoreError> {
        let Some(pool) = db.reader("list reviews") else {
            return Ok(Vec::new());
        };

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, booking_id, client_id, artist_id, rating, comment, created_at
            FROM reviews
            WHERE artist_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    /// Finds the review of a booking
    pub async fn find_by_booking(db: &Database, booking_id: Uuid) -> Result<Option<Self>, StoreError> {
        let Some(pool) = db.reader("get review") else {
            return Ok(None);
        };

        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, booking_id, client_id, artist_id, rating, comment, created_at
            FROM reviews
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        Ok(review)
    }

    /// Average rating and review count of an artist profile
    ///
    /// Returns `None` when the database is unavailable; zero reviews give
    /// `{average: 0, count: 0}`.
    pub async fn average_rating(
        db: &Database,
        artist_id: Uuid,
    ) -> Result<Option<RatingSummary>, StoreError> {
        let Some(pool) = db.reader("get average rating") else {
            return Ok(None);
        };

        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT COALESCE(AVG(rating), 0)::float8 AS average, COUNT(*) AS count
            FROM reviews
            WHERE artist_id = $1
            "#,
        )
        .bind(artist_id)
        .fetch_one(pool)
        .await?;

        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_summary_default() {
        let summary = RatingSummary::default();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);

        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["count"], 0);
    }

    #[tokio::test]
    async fn test_review_queries_without_database() {
        let db = Database::unavailable();
        assert!(Review::list_by_artist(&db, Uuid::new_v4()).await.unwrap().is_empty());
        assert!(Review::average_rating(&db, Uuid::new_v4()).await.unwrap().is_none());
        assert!(matches!(
            Review::create(
                &db,
                CreateReview {
                    booking_id: Uuid::new_v4(),
                    client_id: Uuid::new_v4(),
                    rating: 5,
                    comment: None,
                }
            )
            .await,
            Err(StoreError::Unavailable)
        ));
    }
}
