// handlers/elevated/users.rs - GET /api/admin/users handler

use axum::extract::State;

use crate::database::models::user::AdminUserView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::profile_service::ProfileService;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<AdminUserView>> {
    let users = ProfileService::new(state.pool()).list_users(&state.admins).await?;
    Ok(ApiResponse::success(users))
}
