//! Category model
//!
//! Categories are reference data seeded by the initial migration. Admins can
//! add more; nothing updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::error::StoreError;

/// Service category (painting, photography, music, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl Category {
    /// Creates a category
    ///
    /// # Errors
    ///
    /// Unique violation on `categories_name_key` or `categories_slug_key`
    pub async fn create(db: &Database, data: CreateCategory) -> Result<Self, StoreError> {
        let pool = db.writer("create category")?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, description, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories ordered by name
    pub async fn list(db: &Database) -> Result<Vec<Self>, StoreError> {
        let Some(pool) = db.reader("list categories") else {
            return Ok(Vec::new());
        };

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Finds a category by its URL slug
    pub async fn find_by_slug(db: &Database, slug: &str) -> Result<Option<Self>, StoreError> {
        let Some(pool) = db.reader("get category") else {
            return Ok(None);
        };

        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }
}

/// Whether a string is a valid category slug (lowercase ASCII, digits, hyphens)
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(is_valid_slug("photography"));
        assert!(is_valid_slug("sculpture-3d"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Digital Art"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
    }

    #[tokio::test]
    async fn test_list_degrades_without_database() {
        let db = Database::unavailable();
        assert!(Category::list(&db).await.unwrap().is_empty());
        assert!(Category::find_by_slug(&db, "photography").await.unwrap().is_none());
    }
}
