//! User model and database operations
//!
//! A user is an identity record. The same user can act as a client
//! (requesting bookings) and, through an owned artist profile, as a provider.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     email VARCHAR(320) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     name TEXT,
//!     role user_role NOT NULL DEFAULT 'user',
//!     user_type user_type NOT NULL DEFAULT 'client',
//!     profile_photo_url TEXT,
//!     profile_photo_key VARCHAR(512),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     last_signed_in TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use easel_shared::db::Database;
//! use easel_shared::models::user::{CreateUser, User, UserRole};
//!
//! # async fn example(db: Database) -> Result<(), Box<dyn std::error::Error>> {
//! let user = User::create(&db, CreateUser {
//!     email: "painter@example.com".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//!     name: Some("Ada".to_string()),
//!     role: UserRole::User,
//! }).await?;
//!
//! let found = User::find_by_email(&db, "painter@example.com").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::error::StoreError;

/// Which side(s) of the marketplace a user acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Requests bookings
    Client,

    /// Offers services through an artist profile
    Artist,

    /// Both of the above
    Both,
}

impl UserType {
    /// Converts user type to string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Artist => "artist",
            UserType::Both => "both",
        }
    }

    /// Whether this user type may act as a provider
    pub fn is_provider(&self) -> bool {
        matches!(self, UserType::Artist | UserType::Both)
    }

    /// User type after the user creates an artist profile
    ///
    /// Clients become artists; artists and "both" users are unchanged.
    pub fn after_becoming_artist(self) -> UserType {
        match self {
            UserType::Client => UserType::Artist,
            other => other,
        }
    }
}

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    User,

    /// Platform administrator
    Admin,
}

impl UserRole {
    /// Converts role to string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address (unique)
    pub email: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Platform role
    pub role: UserRole,

    /// Marketplace side(s)
    pub user_type: UserType,

    /// Public URL of the profile photo
    pub profile_photo_url: Option<String>,

    /// Blob storage key of the profile photo
    pub profile_photo_key: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last signed in
    pub last_signed_in: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Platform role
    pub role: UserRole,
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, user_type, \
     profile_photo_url, profile_photo_key, created_at, updated_at, last_signed_in";

impl User {
    /// Creates a new user (as a client)
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (`users_email_key`) or
    /// the database is unavailable
    pub async fn create(db: &Database, data: CreateUser) -> Result<Self, StoreError> {
        let pool = db.writer("create user")?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.name)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(db: &Database, id: Uuid) -> Result<Option<Self>, StoreError> {
        let Some(pool) = db.reader("get user") else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(db: &Database, email: &str) -> Result<Option<Self>, StoreError> {
        let Some(pool) = db.reader("get user") else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Sets the user's marketplace type
    ///
    /// Returns false if the user doesn't exist.
    pub async fn update_user_type(
        db: &Database,
        id: Uuid,
        user_type: UserType,
    ) -> Result<bool, StoreError> {
        let pool = db.writer("update user type")?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET user_type = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(user_type)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets or clears the profile photo (URL and storage key together)
    pub async fn update_profile_photo(
        db: &Database,
        id: Uuid,
        photo_url: Option<String>,
        photo_key: Option<String>,
    ) -> Result<bool, StoreError> {
        let pool = db.writer("update profile photo")?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET profile_photo_url = $2, profile_photo_key = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(photo_url)
        .bind(photo_key)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records a successful sign-in
    pub async fn touch_last_signed_in(db: &Database, id: Uuid) -> Result<bool, StoreError> {
        let pool = db.writer("update last sign-in")?;

        let result = sqlx::query("UPDATE users SET last_signed_in = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_becomes_artist() {
        assert_eq!(UserType::Client.after_becoming_artist(), UserType::Artist);
    }

    #[test]
    fn test_both_and_artist_unchanged_by_becoming_artist() {
        assert_eq!(UserType::Both.after_becoming_artist(), UserType::Both);
        assert_eq!(UserType::Artist.after_becoming_artist(), UserType::Artist);
    }

    #[test]
    fn test_is_provider() {
        assert!(!UserType::Client.is_provider());
        assert!(UserType::Artist.is_provider());
        assert!(UserType::Both.is_provider());
    }

    #[test]
    fn test_user_type_serde() {
        let json = serde_json::to_string(&UserType::Both).unwrap();
        assert_eq!(json, "\"both\"");

        let parsed: UserType = serde_json::from_str("\"artist\"").unwrap();
        assert_eq!(parsed, UserType::Artist);

        assert!(serde_json::from_str::<UserType>("\"admin\"").is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: None,
            role: UserRole::User,
            user_type: UserType::Client,
            profile_photo_url: None,
            profile_photo_key: None,
            created_at: now,
            updated_at: now,
            last_signed_in: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["user_type"], "client");
        assert_eq!(json["role"], "user");
    }

    #[tokio::test]
    async fn test_reads_degrade_without_database() {
        let db = Database::unavailable();
        assert!(User::find_by_id(&db, Uuid::new_v4()).await.unwrap().is_none());
        assert!(User::find_by_email(&db, "x@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_writes_fail_without_database() {
        let db = Database::unavailable();
        let result = User::update_user_type(&db, Uuid::new_v4(), UserType::Both).await;
        assert!(matches!(result, Err(StoreError::Unavailable)));
    }
}
