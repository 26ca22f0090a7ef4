// handlers/public/search.rs - GET /api/search handler

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::pagination::PageQuery;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::search_service::{SearchResponse, SearchService, SearchType};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(rename = "type")]
    pub search_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Only an unknown `type` is an error; storage failures come back as an
/// empty result.
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<SearchResponse> {
    let search_type = match query.search_type.as_deref() {
        None | Some("") => SearchType::All,
        Some(raw) => SearchType::parse(raw).ok_or_else(|| {
            ApiError::bad_request(format!(
                "Invalid search type: {} (expected all, publication, event, policy or member)",
                raw
            ))
        })?,
    };

    let limits = &state.config.search;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(limits.default_limit, limits.max_limit);

    let response = SearchService::new(state.pool()).search(&query.q, search_type, page).await;
    Ok(ApiResponse::success(response))
}
