// handlers/public/about.rs - GET /api/about/overview handler

use axum::extract::State;

use crate::database::models::about::{nest_cards, AboutCard, AboutSection, SectionWithCards};
use crate::database::resource::ListFilter;
use crate::database::Repository;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// Sections in display order, each carrying its cards in display order
pub async fn overview(State(state): State<AppState>) -> ApiResult<Vec<SectionWithCards>> {
    let pool = state.pool();
    let sections = Repository::<AboutSection>::new(pool.clone());
    let cards = Repository::<AboutCard>::new(pool);
    let (sections, cards) = futures::try_join!(
        sections.list(ListFilter::public(None)),
        cards.list(ListFilter::public(None)),
    )?;

    Ok(ApiResponse::success(nest_cards(sections, cards)))
}
