// handlers/elevated/publications.rs - Publication review and editing
//
// GET              /api/admin/publications?status=
// GET/PATCH/DELETE /api/admin/publications/:id
// POST             /api/admin/publications/:id/approve
// POST             /api/admin/publications/:id/reject

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::api::{parse_id, validate, Validate, ValidatedJson};
use crate::database::models::publication::{
    ApprovePublication, PublicationDetail, RejectPublication, UpdatePublication, PUBLICATION_STATUSES,
};
use crate::error::{ApiError, FieldErrors};
use crate::handlers::resource::Deleted;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::publication_service::PublicationService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Vec<PublicationDetail>> {
    let status = filter.status.as_deref().filter(|s| !s.is_empty());
    let mut errors = FieldErrors::new();
    validate::one_of(&mut errors, "status", status, PUBLICATION_STATUSES);
    if !errors.is_empty() {
        return Err(ApiError::validation_error("Invalid filter", Some(errors)));
    }

    let rows = PublicationService::new(state.pool()).list_all(status).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PublicationDetail> {
    let id = parse_id(&id)?;
    let detail = PublicationService::new(state.pool()).get(id).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<UpdatePublication>,
) -> ApiResult<PublicationDetail> {
    let id = parse_id(&id)?;
    let detail = PublicationService::new(state.pool()).update(id, patch).await?;
    tracing::debug!(id = %id, actor = %identity.user_id, "Publication edited by admin");
    Ok(ApiResponse::success(detail))
}

/// Body is optional; `{}` or no body approves without changes
pub async fn approve(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<PublicationDetail> {
    let id = parse_id(&id)?;
    let request: ApprovePublication = if body.iter().all(u8::is_ascii_whitespace) {
        ApprovePublication::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(e.to_string()))?
    };
    request.validate()?;

    let detail = PublicationService::new(state.pool())
        .approve(id, request.modifications, &identity.user_id)
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<RejectPublication>,
) -> ApiResult<PublicationDetail> {
    let id = parse_id(&id)?;
    let detail = PublicationService::new(state.pool())
        .reject(id, request.reason, request.details, &identity.user_id)
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    let deleted = PublicationService::new(state.pool()).delete(id).await?;
    tracing::info!(resource = "publications", id = %id, actor = %identity.user_id, deleted, "Deleted");
    Ok(ApiResponse::success(Deleted { deleted }))
}
