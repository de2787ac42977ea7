//! Artist profile model and database operations
//!
//! An artist profile is the provider side of a user (one per user). Bookings
//! and reviews reference the profile ID, not the user ID.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE artist_profiles (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL REFERENCES users(id) UNIQUE,
//!     display_name VARCHAR(255) NOT NULL,
//!     bio TEXT,
//!     location VARCHAR(255),
//!     category_ids UUID[] NOT NULL DEFAULT '{}',
//!     portfolio_images TEXT[] NOT NULL DEFAULT '{}',
//!     hourly_rate INTEGER,
//!     is_available BOOLEAN NOT NULL DEFAULT TRUE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Categories and portfolio images are native arrays, so category filtering
//! is set membership rather than text matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::Database;
use crate::error::StoreError;

/// Artist profile model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArtistProfile {
    /// Unique profile ID
    pub id: Uuid,

    /// Owning user (unique)
    pub user_id: Uuid,

    /// Public display name
    pub display_name: String,

    /// Free-text biography
    pub bio: Option<String>,

    /// Free-text location
    pub location: Option<String>,

    /// Categories this artist offers
    pub category_ids: Vec<Uuid>,

    /// Public URLs of portfolio images, in upload order
    pub portfolio_images: Vec<String>,

    /// Hourly rate in cents
    pub hourly_rate: Option<i32>,

    /// Whether the artist appears in search
    pub is_available: bool,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an artist profile
#[derive(Debug, Clone)]
pub struct CreateArtistProfile {
    /// Owning user
    pub user_id: Uuid,

    /// Public display name
    pub display_name: String,

    /// Biography
    pub bio: Option<String>,

    /// Location
    pub location: Option<String>,

    /// Offered categories
    pub category_ids: Vec<Uuid>,

    /// Hourly rate in cents
    pub hourly_rate: Option<i32>,
}

/// Input for updating an artist profile
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateArtistProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub category_ids: Option<Vec<Uuid>>,
    pub hourly_rate: Option<i32>,
    pub portfolio_images: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

impl UpdateArtistProfile {
    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.category_ids.is_none()
            && self.hourly_rate.is_none()
            && self.portfolio_images.is_none()
            && self.is_available.is_none()
    }
}

/// Artist search filters, combined conjunctively
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistSearch {
    /// Category the artist must offer
    pub category: Option<Uuid>,

    /// Substring of the location
    pub location: Option<String>,

    /// Substring of the display name or bio
    pub search_term: Option<String>,
}

const PROFILE_COLUMNS: &str = "id, user_id, display_name, bio, location, category_ids, \
     portfolio_images, hourly_rate, is_available, created_at, updated_at";

/// Builds a case-insensitive substring pattern, escaping LIKE wildcards
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl ArtistProfile {
    /// Creates an artist profile (available, empty portfolio)
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `artist_profiles_user_id_key` when the
    /// user already has a profile
    pub async fn create(db: &Database, data: CreateArtistProfile) -> Result<Self, StoreError> {
        let pool = db.writer("create artist profile")?;

        let profile = sqlx::query_as::<_, ArtistProfile>(&format!(
            "INSERT INTO artist_profiles (user_id, display_name, bio, location, category_ids, hourly_rate)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(data.user_id)
        .bind(data.display_name)
        .bind(data.bio)
        .bind(data.location)
        .bind(data.category_ids)
        .bind(data.hourly_rate)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }

    /// Finds a profile by ID
    pub async fn find_by_id(db: &Database, id: Uuid) -> Result<Option<Self>, StoreError> {
        let Some(pool) = db.reader("get artist profile") else {
            return Ok(None);
        };

        let profile = sqlx::query_as::<_, ArtistProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM artist_profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Finds the profile owned by a user
    pub async fn find_by_user_id(db: &Database, user_id: Uuid) -> Result<Option<Self>, StoreError> {
        let Some(pool) = db.reader("get artist profile") else {
            return Ok(None);
        };

        let profile = sqlx::query_as::<_, ArtistProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM artist_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Updates a profile
    ///
    /// Only non-None fields in `data` are written. `updated_at` always refreshes.
    pub async fn update(
        db: &Database,
        id: Uuid,
        data: UpdateArtistProfile,
    ) -> Result<Option<Self>, StoreError> {
        let pool = db.writer("update artist profile")?;

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE artist_profiles SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.display_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", display_name = ${}", bind_count));
        }
        if data.bio.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bio = ${}", bind_count));
        }
        if data.location.is_some() {
            bind_count += 1;
            query.push_str(&format!(", location = ${}", bind_count));
        }
        if data.category_ids.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category_ids = ${}", bind_count));
        }
        if data.hourly_rate.is_some() {
            bind_count += 1;
            query.push_str(&format!(", hourly_rate = ${}", bind_count));
        }
        if data.portfolio_images.is_some() {
            bind_count += 1;
            query.push_str(&format!(", portfolio_images = ${}", bind_count));
        }
        if data.is_available.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_available = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROFILE_COLUMNS}"));

        let mut q = sqlx::query_as::<_, ArtistProfile>(&query).bind(id);

        if let Some(display_name) = data.display_name {
            q = q.bind(display_name);
        }
        if let Some(bio) = data.bio {
            q = q.bind(bio);
        }
        if let Some(location) = data.location {
            q = q.bind(location);
        }
        if let Some(category_ids) = data.category_ids {
            q = q.bind(category_ids);
        }
        if let Some(hourly_rate) = data.hourly_rate {
            q = q.bind(hourly_rate);
        }
        if let Some(portfolio_images) = data.portfolio_images {
            q = q.bind(portfolio_images);
        }
        if let Some(is_available) = data.is_available {
            q = q.bind(is_available);
        }

        let profile = q.fetch_optional(pool).await?;

        Ok(profile)
    }

    /// Appends an image URL to the portfolio
    ///
    /// Returns the updated list, or `None` if the profile doesn't exist.
    pub async fn append_portfolio_image(
        db: &Database,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Vec<String>>, StoreError> {
        let pool = db.writer("update portfolio")?;

        let images = sqlx::query_scalar::<_, Vec<String>>(
            r#"
            UPDATE artist_profiles
            SET portfolio_images = array_append(portfolio_images, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING portfolio_images
            "#,
        )
        .bind(id)
        .bind(url)
        .fetch_optional(pool)
        .await?;

        Ok(images)
    }

    /// Removes every occurrence of an image URL from the portfolio
    ///
    /// Returns the updated list, or `None` if the profile doesn't exist.
    pub async fn remove_portfolio_image(
        db: &Database,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Vec<String>>, StoreError> {
        let pool = db.writer("update portfolio")?;

        let images = sqlx::query_scalar::<_, Vec<String>>(
            r#"
            UPDATE artist_profiles
            SET portfolio_images = array_remove(portfolio_images, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING portfolio_images
            "#,
        )
        .bind(id)
        .bind(url)
        .fetch_optional(pool)
        .await?;

        Ok(images)
    }

    /// Searches available artists, newest first
    ///
    /// Filters: category membership, location substring, and display name
    /// or bio substring. Empty strings are treated as absent.
    pub async fn search(db: &Database, params: &ArtistSearch) -> Result<Vec<Self>, StoreError> {
        let Some(pool) = db.reader("search artists") else {
            return Ok(Vec::new());
        };

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PROFILE_COLUMNS} FROM artist_profiles WHERE is_available = TRUE"
        ));

        if let Some(category_id) = params.category {
            builder
                .push(" AND ")
                .push_bind(category_id)
                .push(" = ANY(category_ids)");
        }

        if let Some(location) = non_empty(&params.location) {
            builder
                .push(" AND location ILIKE ")
                .push_bind(like_pattern(location));
        }

        if let Some(term) = non_empty(&params.search_term) {
            let pattern = like_pattern(term);
            builder
                .push(" AND (display_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR bio ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        let profiles = builder
            .build_query_as::<ArtistProfile>()
            .fetch_all(pool)
            .await?;

        Ok(profiles)
    }

    /// Lists every artist profile, newest first
    pub async fn list_all(db: &Database) -> Result<Vec<Self>, StoreError> {
        let Some(pool) = db.reader("list artists") else {
            return Ok(Vec::new());
        };

        let profiles = sqlx::query_as::<_, ArtistProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM artist_profiles ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("Berlin"), "%Berlin%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn test_update_default_is_empty() {
        assert!(UpdateArtistProfile::default().is_empty());

        let update = UpdateArtistProfile {
            is_available: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_non_empty_filters_blank() {
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some("x".to_string())), Some("x"));
    }

    #[tokio::test]
    async fn test_search_degrades_without_database() {
        let db = Database::unavailable();
        let results = ArtistProfile::search(&db, &ArtistSearch::default()).await.unwrap();
        assert!(results.is_empty());
        assert!(ArtistProfile::list_all(&db).await.unwrap().is_empty());
    }
}
