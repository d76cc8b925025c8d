//! Multi-statement domain operations.
//!
//! Handlers call these for anything that must hold together across more
//! than one statement; single-statement reads stay in the handlers.

pub mod catalog;
pub mod creator;
pub mod interactions;
pub mod library;
pub mod preferences;
pub mod series;
pub mod social;

use thiserror::Error;

use crate::database::DatabaseError;
use crate::error::ApiError;

pub use catalog::CatalogService;
pub use creator::CreatorService;
pub use interactions::InteractionService;
pub use library::LibraryService;
pub use preferences::PreferenceService;
pub use series::SeriesService;
pub use social::SocialService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(db) => db.into(),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Invalid(msg) => ApiError::bad_request(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
        }
    }
}

/// Whether an insert-if-absent or delete actually changed a row, plus the
/// counter value afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Toggle {
    pub changed: bool,
    pub count: i64,
}
