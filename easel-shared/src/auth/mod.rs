//! Authentication and authorization
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing
//! - [`jwt`]: Access/refresh token issue and validation
//! - [`middleware`]: Bearer token extraction and [`middleware::AuthContext`]
//! - [`authorization`]: Booking, review and admin policy checks
//!
//! # Example
//!
//! ```no_run
//! use easel_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("watercolour-7")?;
//! assert!(verify_password("watercolour-7", &hash)?);
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
