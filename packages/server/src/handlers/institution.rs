use axum::{Json, extract::Path, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::institution;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppQuery;
use crate::models::institution::{InstitutionListQuery, InstitutionResponse};
use crate::models::shared::contains_pattern;
use crate::state::AppState;
use crate::utils::filter::{lower_like, resolve_ordering};

#[utoipa::path(
    get,
    path = "/",
    tag = "Institutions",
    operation_id = "listInstitutions",
    summary = "List institutions",
    description = "Ordered by name unless `ordering` (`name` or `created_at`, optionally prefixed \
        with `-`) says otherwise. `search` narrows by a case-insensitive name substring.",
    params(InstitutionListQuery),
    responses(
        (status = 200, description = "Institutions", body = Vec<InstitutionResponse>),
        (status = 400, description = "Unknown ordering (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_institutions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<InstitutionListQuery>,
) -> Result<Json<Vec<InstitutionResponse>>, AppError> {
    let (sort_column, sort_order) = resolve_ordering(
        query.ordering.as_deref(),
        "name",
        &[
            ("name", institution::Column::Name),
            ("created_at", institution::Column::CreatedAt),
        ],
    )?;
    let mut select = institution::Entity::find();
    if let Some(pattern) = query.search.as_deref().and_then(contains_pattern) {
        select = select.filter(lower_like(institution::Column::Name, &pattern));
    }
    let rows = select
        .order_by(sort_column, sort_order)
        .order_by_asc(institution::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(InstitutionResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Institutions",
    operation_id = "getInstitution",
    summary = "Get an institution",
    params(("id" = i32, Path, description = "Institution ID")),
    responses(
        (status = 200, description = "Institution", body = InstitutionResponse),
        (status = 404, description = "Institution not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_institution(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let row = institution::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Institution not found".into()))?;
    Ok(Json(row.into()))
}
