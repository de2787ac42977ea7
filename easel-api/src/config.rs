//! Configuration management for the API server
//!
//! Configuration comes from environment variables (a `.env` file is loaded
//! first when present).
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8080)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
//! - `PRODUCTION`: Enables HSTS (default: false)
//! - `MAX_UPLOAD_BYTES`: Request body limit for image uploads (default: 10 MiB)
//! - `DATABASE_URL`: PostgreSQL connection string (optional; without it reads
//!   return empty results and writes fail with 503)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `RUN_MIGRATIONS`: Apply embedded migrations at startup (default: true)
//! - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 chars)
//! - `BOOKING_TRANSITIONS`: `permissive` (default) or `strict`
//! - `BLOB_ENDPOINT`, `BLOB_API_KEY`, `BLOB_PUBLIC_URL`: Object storage for
//!   uploads (in-memory store when no endpoint is set)
//! - `OWNER_EMAIL`: Account registered with this email becomes admin
//!
//! # Example
//!
//! ```no_run
//! use easel_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use easel_shared::auth::authorization::TransitionPolicy;
use serde::{Deserialize, Serialize};
use std::env;

/// Default request body limit for uploads
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Booking lifecycle configuration
    pub bookings: BookingConfig,

    /// Blob storage configuration
    pub blob: BlobConfig,

    /// Email that is granted the admin role at registration
    pub owner_email: Option<String>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` means any)
    pub cors_origins: Vec<String>,

    /// Production mode (adds HSTS)
    pub production: bool,

    /// Body limit for upload routes
    pub max_upload_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: Option<String>,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Whether to run migrations at startup
    pub run_migrations: bool,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Booking lifecycle configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingConfig {
    /// How strictly status updates follow the lifecycle
    pub transitions: TransitionPolicy,
}

/// Blob storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Upload endpoint
    pub endpoint: Option<String>,

    /// Bearer key for uploads
    pub api_key: Option<String>,

    /// Base URL objects are served from (defaults to the endpoint)
    pub public_url: Option<String>,
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("Invalid boolean value '{}'", other),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or short, or any variable
    /// has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from a variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("API_PORT")
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid API_PORT: {}", e))?
            .unwrap_or(8080);

        let cors_origins = var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let production = var("PRODUCTION")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(false);

        let max_upload_bytes = var("MAX_UPLOAD_BYTES")
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES: {}", e))?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_MAX_CONNECTIONS: {}", e))?
            .unwrap_or(10);

        let run_migrations = var("RUN_MIGRATIONS")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(true);

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let transitions = var("BOOKING_TRANSITIONS")
            .map(|v| v.parse::<TransitionPolicy>())
            .transpose()
            .map_err(|e| anyhow::anyhow!(e))?
            .unwrap_or_default();

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
                max_upload_bytes,
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL"),
                max_connections,
                run_migrations,
            },
            jwt: JwtConfig { secret: jwt_secret },
            bookings: BookingConfig { transitions },
            blob: BlobConfig {
                endpoint: var("BLOB_ENDPOINT"),
                api_key: var("BLOB_API_KEY"),
                public_url: var("BLOB_PUBLIC_URL"),
            },
            owner_email: var("OWNER_EMAIL").map(|e| e.trim().to_lowercase()),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }

    /// Whether an email belongs to the platform owner
    pub fn is_owner_email(&self, email: &str) -> bool {
        self.owner_email
            .as_deref()
            .is_some_and(|owner| owner.eq_ignore_ascii_case(email.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.allows_any_origin());
        assert!(!config.api.production);
        assert_eq!(config.api.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert_eq!(config.bookings.transitions, TransitionPolicy::Permissive);
        assert!(config.blob.endpoint.is_none());
        assert!(config.owner_email.is_none());
    }

    #[test]
    fn test_jwt_secret_required_and_long() {
        assert!(load(&[]).is_err());
        assert!(load(&[("JWT_SECRET", "short")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("CORS_ORIGINS", "https://easel.example, https://admin.easel.example"),
            ("PRODUCTION", "true"),
            ("DATABASE_URL", "postgresql://localhost/easel"),
            ("RUN_MIGRATIONS", "false"),
            ("BOOKING_TRANSITIONS", "strict"),
            ("BLOB_ENDPOINT", "https://blobs.internal"),
            ("OWNER_EMAIL", " Owner@Easel.Example "),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.api.cors_origins.len(), 2);
        assert!(!config.allows_any_origin());
        assert!(config.api.production);
        assert_eq!(config.database.url.as_deref(), Some("postgresql://localhost/easel"));
        assert!(!config.database.run_migrations);
        assert_eq!(config.bookings.transitions, TransitionPolicy::Strict);
        assert_eq!(config.blob.endpoint.as_deref(), Some("https://blobs.internal"));
        assert!(config.is_owner_email("owner@easel.example"));
        assert!(!config.is_owner_email("someone@easel.example"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("JWT_SECRET", SECRET), ("API_PORT", "eighty")]).is_err());
        assert!(load(&[("JWT_SECRET", SECRET), ("PRODUCTION", "maybe")]).is_err());
        assert!(load(&[("JWT_SECRET", SECRET), ("BOOKING_TRANSITIONS", "loose")]).is_err());
    }

    #[test]
    fn test_empty_database_url_is_unset() {
        let config = load(&[("JWT_SECRET", SECRET), ("DATABASE_URL", "")]).unwrap();
        assert!(config.database.url.is_none());
    }
}
