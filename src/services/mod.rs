pub mod campaign_service;
pub mod contact_service;
pub mod profile_service;
pub mod publication_service;
pub mod search_service;
pub mod slug;

use crate::database::manager::DatabaseError;

/// Domain-level failures raised by multi-step operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// A referencing row blocks the operation
    #[error("{0}")]
    InUse(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    NotOwner(String),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}
