/// Store-level error taxonomy
///
/// Every store operation returns `Result<T, StoreError>`. The variants map
/// one-to-one onto the HTTP statuses the API layer emits:
///
/// - `Validation`: malformed or missing required input, with field detail
/// - `NotFound`: the referenced entity is absent, soft-deleted, or not owned
///   by the caller; ownership failures are deliberately indistinguishable
///   from missing records so that existence never leaks
/// - `Conflict`: a unique field collision (e.g. an already-registered email)
/// - `Database`: the persistence layer failed; surfaced immediately, never
///   retried inside the core
///
/// # Example
///
/// ```
/// use taskhub_shared::error::StoreError;
///
/// let err = StoreError::not_found("task");
/// assert_eq!(err.to_string(), "task not found");
/// ```
use std::borrow::Cow;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Unified error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input failed validation before reaching the database
    #[error("validation failed on `{field}`: {message}")]
    Validation {
        /// Field that failed validation
        field: Cow<'static, str>,
        /// Human-readable message
        message: Cow<'static, str>,
    },

    /// Entity absent, soft-deleted, or not owned by the caller
    #[error("{0} not found")]
    NotFound(Cow<'static, str>),

    /// Unique field collision
    #[error("conflict: {0}")]
    Conflict(Cow<'static, str>),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        StoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a missing (or not-owned) entity
    pub fn not_found(entity: impl Into<Cow<'static, str>>) -> Self {
        StoreError::NotFound(entity.into())
    }

    /// Shorthand for a unique-field conflict
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        StoreError::Conflict(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = StoreError::validation("title", "must not be empty");
        assert_eq!(
            err.to_string(),
            "validation failed on `title`: must not be empty"
        );
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(StoreError::not_found("comment").to_string(), "comment not found");
    }

    #[test]
    fn test_conflict_display() {
        let err = StoreError::conflict("email already registered");
        assert_eq!(err.to_string(), "conflict: email already registered");
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
