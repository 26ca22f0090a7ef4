pub mod auth;
pub mod response;

pub use auth::{identify, require_access, Access, Caller, Identity};
pub use response::{ApiResponse, ApiResult};
