// handlers/public/contact.rs - POST /api/contact handler

use axum::extract::State;

use crate::api::ValidatedJson;
use crate::database::models::contact::{ContactSubmission, CreateContactSubmission};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::contact_service::ContactService;
use crate::AppState;

/// Public intake; the stored row always starts in status `new`
pub async fn submit(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateContactSubmission>,
) -> ApiResult<ContactSubmission> {
    let row = ContactService::new(state.pool()).submit(input).await?;
    Ok(ApiResponse::created(row))
}
