// handlers/elevated/contact.rs - Contact submission triage
//
// GET    /api/admin/contact
// PATCH  /api/admin/contact/:id/status
// DELETE /api/admin/contact/:id

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::{parse_id, ValidatedJson};
use crate::database::models::contact::{ContactStatusUpdate, ContactSubmission};
use crate::handlers::resource::Deleted;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::contact_service::ContactService;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ContactSubmission>> {
    let rows = ContactService::new(state.pool()).list().await?;
    Ok(ApiResponse::success(rows))
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<ContactStatusUpdate>,
) -> ApiResult<ContactSubmission> {
    let id = parse_id(&id)?;
    let row = ContactService::new(state.pool()).set_status(id, update.status).await?;
    tracing::debug!(id = %id, actor = %identity.user_id, "Contact status set by admin");
    Ok(ApiResponse::success(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    let deleted = ContactService::new(state.pool()).delete(id).await?;
    tracing::info!(resource = "contact_submissions", id = %id, actor = %identity.user_id, deleted, "Deleted");
    Ok(ApiResponse::success(Deleted { deleted }))
}
