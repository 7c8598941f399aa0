//! Repository module
//!
//! CRUD operations over the SQLite pool, one module per table group.
//! Functions are plain async fns taking `&SqlitePool` so services can
//! compose them freely (and tests can run them on an in-memory pool).

pub mod family;
pub mod family_member;
pub mod gift_group;
pub mod message;
pub mod profile;
pub mod user;
pub mod verification_token;
pub mod wishlist;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
