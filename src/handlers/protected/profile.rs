// handlers/protected/profile.rs - The caller's own profile and memberships
//
// GET   /api/profile
// PATCH /api/profile
// GET   /api/profile/memberships

use axum::{extract::State, Extension};

use crate::api::ValidatedJson;
use crate::database::models::membership::Membership;
use crate::database::models::user::{UpdateProfile, User};
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::profile_service::ProfileService;
use crate::AppState;

pub async fn get(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<User> {
    let user = ProfileService::new(state.pool()).get_or_provision(&identity).await?;
    Ok(ApiResponse::success(user))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(patch): ValidatedJson<UpdateProfile>,
) -> ApiResult<User> {
    let user = ProfileService::new(state.pool()).update(&identity, patch).await?;
    tracing::info!(user_id = %identity.user_id, "Profile updated");
    Ok(ApiResponse::success(user))
}

pub async fn memberships(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<Membership>> {
    let rows = ProfileService::new(state.pool()).memberships(&identity.user_id).await?;
    Ok(ApiResponse::success(rows))
}
