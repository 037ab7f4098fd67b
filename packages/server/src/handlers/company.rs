use std::collections::HashMap;

use axum::{Json, extract::Path, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::company;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppQuery;
use crate::models::company::{CompanyListQuery, CompanyResponse, CompanyWithInternshipsResponse};
use crate::models::internship::InternshipListQuery;
use crate::models::shared::contains_pattern;
use crate::state::AppState;
use crate::utils::filter::{find_listed_internships, lower_like, resolve_ordering};
use crate::utils::present;

#[utoipa::path(
    get,
    path = "/",
    tag = "Companies",
    operation_id = "listCompanies",
    summary = "List verified companies",
    description = "Only verified, active companies appear. `search` matches name or description \
        case-insensitively. `ordering` accepts `name` or `created_at`, optionally prefixed with \
        `-`. Each entry carries the mean review rating.",
    params(CompanyListQuery),
    responses(
        (status = 200, description = "Companies, by name unless `ordering` says otherwise", body = Vec<CompanyResponse>),
        (status = 400, description = "Unknown ordering (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_companies(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CompanyListQuery>,
) -> Result<Json<Vec<CompanyResponse>>, AppError> {
    let (sort_column, sort_order) = resolve_ordering(
        query.ordering.as_deref(),
        "name",
        &[
            ("name", company::Column::Name),
            ("created_at", company::Column::CreatedAt),
        ],
    )?;
    let mut select = company::Entity::find()
        .filter(company::Column::IsVerified.eq(true))
        .filter(company::Column::IsActive.eq(true));
    if let Some(pattern) = query.search.as_deref().and_then(contains_pattern) {
        select = select.filter(
            Condition::any()
                .add(lower_like(company::Column::Name, &pattern))
                .add(lower_like(company::Column::Description, &pattern)),
        );
    }
    let rows = select
        .order_by(sort_column, sort_order)
        .order_by_asc(company::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(
        present::company_responses(&state.db, &state.config.server.public_url, rows).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Companies",
    operation_id = "getCompany",
    summary = "Get a verified company",
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = CompanyResponse),
        (status = 404, description = "Company not found or not listed (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CompanyResponse>, AppError> {
    let row = company::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .filter(company::Model::is_listed)
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;
    Ok(Json(
        present::company_response(&state.db, &state.config.server.public_url, row).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/with-internships",
    tag = "Companies",
    operation_id = "listCompaniesWithInternships",
    summary = "Companies owning matching internships",
    description = "Applies the internship filters, then groups the matches by company. Companies \
        are ordered by name.",
    params(InternshipListQuery),
    responses(
        (status = 200, description = "Companies with their matching internships", body = Vec<CompanyWithInternshipsResponse>),
        (status = 400, description = "Unknown ordering (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_companies_with_internships(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<InternshipListQuery>,
) -> Result<Json<Vec<CompanyWithInternshipsResponse>>, AppError> {
    let internships = find_listed_internships(&state.db, &query).await?;
    let internships =
        present::internship_responses(&state.db, &state.config.server.public_url, internships)
            .await?;

    let mut grouped: HashMap<i32, CompanyWithInternshipsResponse> = HashMap::new();
    for item in internships {
        grouped
            .entry(item.company.id)
            .or_insert_with(|| CompanyWithInternshipsResponse {
                company: item.company.clone(),
                internships: Vec::new(),
            })
            .internships
            .push(item);
    }

    let mut companies: Vec<_> = grouped.into_values().collect();
    companies.sort_by(|a, b| {
        a.company
            .name
            .cmp(&b.company.name)
            .then(a.company.id.cmp(&b.company.id))
    });
    Ok(Json(companies))
}

