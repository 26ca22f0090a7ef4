// handlers/public/admin_check.rs - GET /api/admin/check handler

use axum::Extension;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, Caller};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheck {
    pub is_admin: bool,
}

/// Answers for any caller; false without a valid identity
pub async fn check(Extension(caller): Extension<Caller>) -> ApiResult<AdminCheck> {
    let is_admin = caller.0.map(|identity| identity.is_admin).unwrap_or(false);
    Ok(ApiResponse::success(AdminCheck { is_admin }))
}
