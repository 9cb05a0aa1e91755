//! Query helpers shared by the SeaORM stores.

use sea_orm::{DbErr, SqlErr};

use crate::errors::AppError;

/// `%term%` with LIKE wildcards in the term escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Map a unique constraint violation to a 409 with the given message.
pub(crate) fn conflict_on_unique(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%detail, "Unique constraint violated");
            AppError::conflict(message)
        }
        _ => AppError::from(err),
    }
}

/// Postgres aborts one side of a conflicting serializable pair with 40001.
pub(crate) fn is_serialization_failure(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("40001") || message.contains("could not serialize access")
}
