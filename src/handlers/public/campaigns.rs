// handlers/public/campaigns.rs - Advocacy campaign reads
//
// GET /api/policy/campaigns
// GET /api/policy/campaigns/:id

use axum::extract::{Path, State};

use crate::api::parse_id;
use crate::database::models::policy::AdvocacyCampaign;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::campaign_service::CampaignService;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<AdvocacyCampaign>> {
    let rows = CampaignService::new(state.pool()).list().await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<AdvocacyCampaign> {
    let id = parse_id(&id)?;
    let row = CampaignService::new(state.pool()).get(id).await?;
    Ok(ApiResponse::success(row))
}
