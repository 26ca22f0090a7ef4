// handlers/protected/publications.rs - Author publication workflow
//
// GET/POST           /api/profile/publications
// GET/PATCH/DELETE   /api/profile/publications/:id
// POST               /api/profile/publications/:id/submit
//
// Every handler is scoped to publications the caller authored.

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::{parse_id, ValidatedJson};
use crate::database::models::publication::{CreatePublication, PublicationDetail, UpdatePublication};
use crate::handlers::resource::Deleted;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::publication_service::PublicationService;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<PublicationDetail>> {
    let rows = PublicationService::new(state.pool()).list_for_author(&identity.user_id).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(input): ValidatedJson<CreatePublication>,
) -> ApiResult<PublicationDetail> {
    let detail = PublicationService::new(state.pool()).create(&identity.user_id, input).await?;
    Ok(ApiResponse::created(detail))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<PublicationDetail> {
    let id = parse_id(&id)?;
    let detail = PublicationService::new(state.pool()).get_for_author(id, &identity.user_id).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<UpdatePublication>,
) -> ApiResult<PublicationDetail> {
    let id = parse_id(&id)?;
    let detail = PublicationService::new(state.pool())
        .update_for_author(id, &identity.user_id, patch)
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<PublicationDetail> {
    let id = parse_id(&id)?;
    let detail = PublicationService::new(state.pool()).submit(id, &identity.user_id).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    let deleted = PublicationService::new(state.pool())
        .delete_for_author(id, &identity.user_id)
        .await?;
    tracing::info!(id = %id, author = %identity.user_id, deleted, "Publication deleted by author");
    Ok(ApiResponse::success(Deleted { deleted }))
}
