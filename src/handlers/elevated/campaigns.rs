// handlers/elevated/campaigns.rs - Advocacy campaign administration
//
// Campaigns expose `achievements` as a list while storing serialized text,
// so they are routed here instead of through the generic resource handlers.
// Reads are shared with the public tier (handlers::public::campaigns).

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::{parse_id, ValidatedJson};
use crate::database::models::policy::{AdvocacyCampaign, CreateCampaign, UpdateCampaign};
use crate::database::resource::NewRecord;
use crate::handlers::resource::Deleted;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::campaign_service::CampaignService;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(input): ValidatedJson<NewRecord<CreateCampaign>>,
) -> ApiResult<AdvocacyCampaign> {
    let row = CampaignService::new(state.pool()).create(input).await?;
    tracing::debug!(id = %row.id, actor = %identity.user_id, "Campaign create by admin");
    Ok(ApiResponse::created(row))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<UpdateCampaign>,
) -> ApiResult<AdvocacyCampaign> {
    let id = parse_id(&id)?;
    let row = CampaignService::new(state.pool()).update(id, patch).await?;
    tracing::debug!(id = %id, actor = %identity.user_id, "Campaign update by admin");
    Ok(ApiResponse::success(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    let deleted = CampaignService::new(state.pool()).delete(id).await?;
    tracing::info!(resource = "advocacy_campaigns", id = %id, actor = %identity.user_id, deleted, "Deleted");
    Ok(ApiResponse::success(Deleted { deleted }))
}
