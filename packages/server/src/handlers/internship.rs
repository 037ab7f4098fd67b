use axum::{Json, extract::Path, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{company, internship};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppQuery;
use crate::models::internship::{InternshipListQuery, InternshipResponse};
use crate::state::AppState;
use crate::utils::filter::{available_techs, find_listed_internships};
use crate::utils::present;
use crate::utils::tags::TagList;

#[utoipa::path(
    get,
    path = "/",
    tag = "Internships",
    operation_id = "listInternships",
    summary = "List open internships",
    description = "Only active internships of verified, active companies are listed. \
        `tech_stack` takes a comma-separated list; an internship matches when any of its tags \
        equals any requested tag, ignoring case.",
    params(InternshipListQuery),
    responses(
        (status = 200, description = "Matching internships", body = Vec<InternshipResponse>),
        (status = 400, description = "Unknown ordering (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_internships(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<InternshipListQuery>,
) -> Result<Json<Vec<InternshipResponse>>, AppError> {
    let rows = find_listed_internships(&state.db, &query).await?;
    Ok(Json(
        present::internship_responses(&state.db, &state.config.server.public_url, rows).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Internships",
    operation_id = "getInternship",
    summary = "Get an open internship",
    params(("id" = i32, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Internship", body = InternshipResponse),
        (status = 404, description = "Internship not found or not listed (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_internship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InternshipResponse>, AppError> {
    let not_found = || AppError::NotFound("Internship not found".into());
    let row = internship::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .filter(|i| i.is_active)
        .ok_or_else(not_found)?;
    let listed = company::Entity::find_by_id(row.company_id)
        .one(&state.db)
        .await?
        .is_some_and(|c| c.is_listed());
    if !listed {
        return Err(not_found());
    }
    Ok(Json(
        present::internship_response(&state.db, &state.config.server.public_url, row).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/available-techs",
    tag = "Internships",
    operation_id = "listAvailableTechs",
    summary = "Technologies used by matching internships",
    description = "Sorted, distinct technology tags across the internships selected by the same \
        filters as the listing. Spellings that differ only in case are listed separately.",
    params(InternshipListQuery),
    responses(
        (status = 200, description = "Technology tags", body = Vec<String>, example = json!(["Go", "Python", "Rust", "python"])),
        (status = 400, description = "Unknown ordering (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_available_techs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<InternshipListQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let rows = find_listed_internships(&state.db, &query).await?;
    Ok(Json(available_techs(
        rows.iter().map(|i| TagList::from_json(&i.tech_stack)),
    )))
}
