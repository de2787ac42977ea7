//! # Easel Shared Library
//!
//! This crate contains the data layer and business rules shared by the Easel
//! marketplace API: a two-sided marketplace connecting clients with artists.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool, migrations and the storage handle
//! - `models`: Database models and their queries
//! - `auth`: Authentication and booking/review authorization rules
//! - `storage`: Blob storage for profile photos and portfolio images
//! - `error`: Data-access error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod storage;

/// Current version of the Easel shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
