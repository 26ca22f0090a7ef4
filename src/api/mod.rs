pub mod pagination;
pub mod validate;

pub use pagination::{Page, PageQuery, PageRequest};
pub use validate::{Validate, ValidatedJson};

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path id, reporting a malformed value as a bad request
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}
