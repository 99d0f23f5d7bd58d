//! Catalogue error taxonomy and its mapping onto HTTP errors.

use bookstore_http::error::AppError;
use thiserror::Error;

use crate::store::RepositoryError;

/// Message reported when a category still has books assigned.
pub const CATEGORY_HAS_BOOKS: &str = "category has associated books, cannot be deleted";

/// Errors raised by the catalogue services and entities.
///
/// All variants are recoverable by the caller. Lookups report absence as
/// `Ok(None)`; `NotFound` is raised by callers that require a value.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UnknownCategory(id) => {
                CatalogError::InvalidArgument(format!("unknown category {}", id))
            }
            RepositoryError::CategoryInUse(_) => {
                CatalogError::ConstraintViolation(CATEGORY_HAS_BOOKS.to_string())
            }
            other => CatalogError::Repository(other),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidArgument(message) => AppError::bad_request(message),
            CatalogError::NotFound(message) => AppError::not_found(message),
            CatalogError::ConstraintViolation(message) => {
                AppError::constraint_violation(Vec::new(), message)
            }
            CatalogError::Repository(err) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn repository_errors_map_to_domain_errors() {
        assert!(matches!(
            CatalogError::from(RepositoryError::UnknownCategory(9)),
            CatalogError::InvalidArgument(message) if message == "unknown category 9"
        ));
        assert!(matches!(
            CatalogError::from(RepositoryError::CategoryInUse(9)),
            CatalogError::ConstraintViolation(message) if message.contains("cannot be deleted")
        ));
        assert!(matches!(
            CatalogError::from(RepositoryError::Database(sqlx::Error::RowNotFound)),
            CatalogError::Repository(_)
        ));
    }

    #[test]
    fn catalog_errors_map_to_statuses() {
        let cases = [
            (
                CatalogError::InvalidArgument("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (CatalogError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                CatalogError::ConstraintViolation(CATEGORY_HAS_BOOKS.into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CatalogError::Repository(RepositoryError::Database(sqlx::Error::PoolClosed)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }
}
