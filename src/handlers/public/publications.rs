// handlers/public/publications.rs - Published publication browsing
//
// GET /api/publications            paginated, ?category=&tag= slug filters
// GET /api/publications/:slug      one published publication
// GET /api/publications/tags       every tag
// GET /api/publications/categories every category

use axum::extract::{Path, Query, State};

use crate::api::pagination::{Page, PageQuery};
use crate::database::models::publication::{PublicationDetail, PublicationQuery, Term};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::publication_service::{PublicationService, TermKind};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PublicationQuery>,
) -> ApiResult<Page<PublicationDetail>> {
    let search = &state.config.search;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(search.default_limit, search.max_limit);

    let result = PublicationService::new(state.pool()).list_published(&query, page).await?;
    Ok(ApiResponse::success(result))
}

pub async fn get_by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<PublicationDetail> {
    let detail = PublicationService::new(state.pool()).get_published_by_slug(&slug).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn tags(State(state): State<AppState>) -> ApiResult<Vec<Term>> {
    let tags = PublicationService::new(state.pool()).list_terms(TermKind::Tag).await?;
    Ok(ApiResponse::success(tags))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<Term>> {
    let categories = PublicationService::new(state.pool()).list_terms(TermKind::Category).await?;
    Ok(ApiResponse::success(categories))
}
