//! Data-access error type
//!
//! Every model query returns `Result<T, StoreError>`. Reads degrade to an
//! empty result when no database is configured, so `Unavailable` is only
//! produced by writes.

/// Error type for data-access operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No database connection is configured
    #[error("Database not available")]
    Unavailable,

    /// Query failed (includes constraint violations)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Name of the violated constraint, if this is a constraint violation
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => db_err.constraint(),
            _ => None,
        }
    }

    /// Whether this error is a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_has_no_constraint() {
        let err = StoreError::Unavailable;
        assert!(err.constraint().is_none());
        assert!(!err.is_unique_violation());
        assert_eq!(err.to_string(), "Database not available");
    }

    #[test]
    fn test_row_not_found_is_not_unique_violation() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_unique_violation());
        assert!(err.to_string().starts_with("Database error"));
    }
}
