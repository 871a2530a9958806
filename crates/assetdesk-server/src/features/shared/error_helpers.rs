//! Database constraint-violation helpers
//!
//! ```rust,ignore
//! sqlx::query("INSERT INTO asset_versions ...")
//!     .execute(&mut *tx)
//!     .await
//!     .map_err(|e| conflict_or_database(e, "version number already taken"))?;
//! ```

use sqlx::Error as SqlxError;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ConstraintViolation {
    UniqueViolation,
    ForeignKeyViolation,
    Other(SqlxError),
}

pub fn check_constraint_violation(error: SqlxError) -> ConstraintViolation {
    if let SqlxError::Database(ref db_err) = error {
        if db_err.is_unique_violation() {
            return ConstraintViolation::UniqueViolation;
        }
        if db_err.is_foreign_key_violation() {
            return ConstraintViolation::ForeignKeyViolation;
        }
    }
    ConstraintViolation::Other(error)
}

pub fn is_unique_violation(error: &SqlxError) -> bool {
    matches!(error, SqlxError::Database(db_err) if db_err.is_unique_violation())
}

pub fn is_foreign_key_violation(error: &SqlxError) -> bool {
    matches!(error, SqlxError::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Unique violation becomes [`StoreError::Conflict`]; anything else stays a database error
pub fn conflict_or_database(error: SqlxError, message: &str) -> StoreError {
    if is_unique_violation(&error) {
        StoreError::Conflict(message.to_string())
    } else {
        StoreError::Database(error)
    }
}

/// Foreign key violation becomes [`StoreError::Validation`]
pub fn reference_or_database(error: SqlxError, message: &str) -> StoreError {
    match check_constraint_violation(error) {
        ConstraintViolation::ForeignKeyViolation => StoreError::Validation(message.to_string()),
        ConstraintViolation::UniqueViolation => StoreError::Conflict(message.to_string()),
        ConstraintViolation::Other(e) => StoreError::Database(e),
    }
}
