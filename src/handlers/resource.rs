// handlers/resource.rs - Generic list/get/create/update/delete for content tables
//
// Public routes apply the resource's visibility predicate; admin routes see
// every row. The admin gate is attached by the caller via route_layer.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::{parse_id, ValidatedJson};
use crate::database::resource::{ListFilter, NewRecord, Resource, Visibility};
use crate::database::{DeleteOutcome, Repository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentQuery {
    pub parent_id: Option<String>,
}

impl ParentQuery {
    fn parent(&self) -> Result<Option<uuid::Uuid>, ApiError> {
        match self.parent_id.as_deref() {
            Some(raw) if !raw.is_empty() => parse_id(raw).map(Some),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// GET {path}, GET {path}/:id
pub fn public_routes<R: Resource>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(list_public::<R>))
        .route(&format!("{}/:id", path), get(get_public::<R>))
}

/// GET/POST /api/admin{path}, GET/PATCH/DELETE /api/admin{path}/:id
pub fn admin_routes<R: Resource>(path: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("/api/admin{}", path), get(list_all::<R>).post(create::<R>))
        .route(
            &format!("/api/admin{}/:id", path),
            get(get_any::<R>).patch(update::<R>).delete(delete::<R>),
        )
}

async fn list_public<R: Resource>(State(state): State<AppState>, Query(query): Query<ParentQuery>) -> ApiResult<Vec<R>> {
    let rows = Repository::<R>::new(state.pool()).list(ListFilter::public(query.parent()?)).await?;
    Ok(ApiResponse::success(rows))
}

async fn get_public<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<R> {
    let id = parse_id(&id)?;
    let row = Repository::<R>::new(state.pool()).get(id, Visibility::Public).await?;
    Ok(ApiResponse::success(row))
}

async fn list_all<R: Resource>(State(state): State<AppState>, Query(query): Query<ParentQuery>) -> ApiResult<Vec<R>> {
    let rows = Repository::<R>::new(state.pool()).list(ListFilter::all(query.parent()?)).await?;
    Ok(ApiResponse::success(rows))
}

async fn get_any<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<R> {
    let id = parse_id(&id)?;
    let row = Repository::<R>::new(state.pool()).get(id, Visibility::All).await?;
    Ok(ApiResponse::success(row))
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(input): ValidatedJson<NewRecord<R::Create>>,
) -> ApiResult<R> {
    let row = Repository::<R>::new(state.pool()).create(input).await?;
    tracing::info!(resource = R::TABLE, id = %row.id(), actor = %identity.user_id, "Created");
    Ok(ApiResponse::created(row))
}

async fn update<R: Resource>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<R::Update>,
) -> ApiResult<R> {
    let id = parse_id(&id)?;
    let row = Repository::<R>::new(state.pool()).update(id, patch).await?;
    tracing::info!(resource = R::TABLE, id = %id, actor = %identity.user_id, "Updated");
    Ok(ApiResponse::success(row))
}

async fn delete<R: Resource>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    match Repository::<R>::new(state.pool()).delete(id).await? {
        DeleteOutcome::InUse(table) => {
            tracing::info!(resource = R::TABLE, id = %id, referenced_by = table, "Delete refused");
            Err(ApiError::bad_request(format!("{} is in use by existing {}", R::LABEL, table)))
        }
        outcome => {
            let deleted = outcome.deleted();
            tracing::info!(resource = R::TABLE, id = %id, actor = %identity.user_id, deleted, "Deleted");
            Ok(ApiResponse::success(Deleted { deleted }))
        }
    }
}
