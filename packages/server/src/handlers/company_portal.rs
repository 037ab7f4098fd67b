//! Endpoints a logged-in company uses to manage its own internships and the
//! applications they receive.

use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use common::StatusActor;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{application, institution, internship, internship_institution};
use crate::error::{AppError, ErrorBody, FieldErrors};
use crate::extractors::auth::Principal;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::application::{
    ApplicationListQuery, ApplicationResponse, UpdateApplicationStatusRequest,
};
use crate::models::internship::{
    CreateInternshipRequest, InternshipResponse, UpdateInternshipRequest,
    validate_create_internship, validate_update_internship,
};
use crate::state::AppState;
use crate::utils::access::{find_company_application, find_company_internship, require_company};
use crate::utils::filter::distinct_in_order;
use crate::utils::present;

/// Check that every referenced institution exists.
async fn check_institutions<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<Vec<i32>, AppError> {
    let ids = distinct_in_order(ids.iter().copied());
    if ids.is_empty() {
        return Ok(ids);
    }
    let found = institution::Entity::find()
        .filter(institution::Column::Id.is_in(ids.clone()))
        .count(db)
        .await?;
    if found != ids.len() as u64 {
        let mut errors = FieldErrors::new();
        errors.add("institution_ids", "One or more institutions do not exist");
        return Err(AppError::InvalidFields(errors));
    }
    Ok(ids)
}

/// Replace the institution links of an internship.
async fn link_institutions<C: ConnectionTrait>(
    db: &C,
    internship_id: i32,
    institution_ids: &[i32],
) -> Result<(), AppError> {
    internship_institution::Entity::delete_many()
        .filter(internship_institution::Column::InternshipId.eq(internship_id))
        .exec(db)
        .await?;
    if institution_ids.is_empty() {
        return Ok(());
    }
    internship_institution::Entity::insert_many(institution_ids.iter().map(|&institution_id| {
        internship_institution::ActiveModel {
            internship_id: Set(internship_id),
            institution_id: Set(institution_id),
        }
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/internships",
    tag = "Company Portal",
    operation_id = "listOwnInternships",
    summary = "List the caller's internships",
    description = "Includes inactive internships. Newest first.",
    responses(
        (status = 200, description = "Internships", body = Vec<InternshipResponse>),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no company profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal), fields(user_id = principal.user_id))]
pub async fn list_own_internships(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Vec<InternshipResponse>>, AppError> {
    let company = require_company(&state.db, &principal).await?;
    let rows = internship::Entity::find()
        .filter(internship::Column::CompanyId.eq(company.id))
        .order_by_desc(internship::Column::CreatedAt)
        .order_by_desc(internship::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(
        present::internship_responses(&state.db, &state.config.server.public_url, rows).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/internships",
    tag = "Company Portal",
    operation_id = "createInternship",
    summary = "Publish an internship",
    request_body = CreateInternshipRequest,
    responses(
        (status = 201, description = "Internship created", body = InternshipResponse),
        (status = 400, description = "Invalid body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no company profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id))]
pub async fn create_internship(
    principal: Principal,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateInternshipRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_internship(&payload)?;
    let company = require_company(&state.db, &principal).await?;
    let institution_ids = check_institutions(&state.db, &payload.institution_ids).await?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let created = internship::ActiveModel {
        company_id: Set(company.id),
        position: Set(payload.position.trim().to_string()),
        description: Set(payload.description),
        location: Set(payload.location.trim().to_string()),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        requirements: Set(payload.requirements),
        tech_stack: Set(payload.tech_stack.to_json()),
        available_positions: Set(payload.available_positions),
        is_active: Set(payload.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    link_institutions(&txn, created.id, &institution_ids).await?;
    txn.commit().await?;

    tracing::info!(internship_id = created.id, company_id = company.id, "Internship created");

    let body =
        present::internship_response(&state.db, &state.config.server.public_url, created).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    get,
    path = "/internships/{id}",
    tag = "Company Portal",
    operation_id = "getOwnInternship",
    summary = "Get one of the caller's internships",
    params(("id" = i32, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Internship", body = InternshipResponse),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Internship not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal), fields(user_id = principal.user_id))]
pub async fn get_own_internship(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InternshipResponse>, AppError> {
    let company = require_company(&state.db, &principal).await?;
    let row = find_company_internship(&state.db, &company, id).await?;
    Ok(Json(
        present::internship_response(&state.db, &state.config.server.public_url, row).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/internships/{id}",
    tag = "Company Portal",
    operation_id = "updateInternship",
    summary = "Edit one of the caller's internships",
    description = "Only supplied fields change. `institution_ids` replaces the whole set.",
    params(("id" = i32, Path, description = "Internship ID")),
    request_body = UpdateInternshipRequest,
    responses(
        (status = 200, description = "Updated internship", body = InternshipResponse),
        (status = 400, description = "Invalid body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Internship not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id))]
pub async fn update_internship(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateInternshipRequest>,
) -> Result<Json<InternshipResponse>, AppError> {
    let company = require_company(&state.db, &principal).await?;
    let current = find_company_internship(&state.db, &company, id).await?;
    validate_update_internship(&payload, &current)?;
    let institution_ids = match &payload.institution_ids {
        Some(ids) => Some(check_institutions(&state.db, ids).await?),
        None => None,
    };

    let txn = state.db.begin().await?;
    let mut am: internship::ActiveModel = current.into();
    if let Some(position) = payload.position {
        am.position = Set(position.trim().to_string());
    }
    if let Some(description) = payload.description {
        am.description = Set(description);
    }
    if let Some(location) = payload.location {
        am.location = Set(location.trim().to_string());
    }
    if let Some(start) = payload.start_date {
        am.start_date = Set(start);
    }
    if let Some(end) = payload.end_date {
        am.end_date = Set(end);
    }
    if let Some(requirements) = payload.requirements {
        am.requirements = Set(requirements);
    }
    if let Some(tags) = payload.tech_stack {
        am.tech_stack = Set(tags.to_json());
    }
    if let Some(n) = payload.available_positions {
        am.available_positions = Set(n);
    }
    if let Some(active) = payload.is_active {
        am.is_active = Set(active);
    }
    am.updated_at = Set(Utc::now());
    let updated = am.update(&txn).await?;
    if let Some(ids) = institution_ids {
        link_institutions(&txn, updated.id, &ids).await?;
    }
    txn.commit().await?;

    Ok(Json(
        present::internship_response(&state.db, &state.config.server.public_url, updated).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/internships/{id}",
    tag = "Company Portal",
    operation_id = "deleteInternship",
    summary = "Delete one of the caller's internships",
    description = "Also removes its institution links and the applications it received.",
    params(("id" = i32, Path, description = "Internship ID")),
    responses(
        (status = 204, description = "Internship deleted"),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Internship not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal), fields(user_id = principal.user_id))]
pub async fn delete_internship(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let company = require_company(&state.db, &principal).await?;
    let row = find_company_internship(&state.db, &company, id).await?;

    let txn = state.db.begin().await?;
    application::Entity::delete_many()
        .filter(application::Column::InternshipId.eq(row.id))
        .exec(&txn)
        .await?;
    internship_institution::Entity::delete_many()
        .filter(internship_institution::Column::InternshipId.eq(row.id))
        .exec(&txn)
        .await?;
    internship::Entity::delete_by_id(row.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(internship_id = row.id, "Internship deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/applications",
    tag = "Company Portal",
    operation_id = "listReceivedApplications",
    summary = "List applications to the caller's internships",
    params(ApplicationListQuery),
    responses(
        (status = 200, description = "Applications with applicant details, newest first", body = Vec<ApplicationResponse>),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no company profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, query), fields(user_id = principal.user_id))]
pub async fn list_received_applications(
    principal: Principal,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ApplicationListQuery>,
) -> Result<Json<Vec<ApplicationResponse>>, AppError> {
    let company = require_company(&state.db, &principal).await?;

    let mut select = application::Entity::find().filter(
        application::Column::InternshipId.in_subquery(
            SeaQuery::select()
                .column(internship::Column::Id)
                .from(internship::Entity)
                .and_where(internship::Column::CompanyId.eq(company.id))
                .to_owned(),
        ),
    );
    if let Some(status) = query.status {
        select = select.filter(application::Column::Status.eq(status));
    }
    if let Some(internship_id) = query.internship {
        select = select.filter(application::Column::InternshipId.eq(internship_id));
    }
    let rows = select
        .order_by_desc(application::Column::CreatedAt)
        .order_by_desc(application::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        present::application_responses(&state.db, &state.config.server.public_url, rows, true)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/applications/{id}",
    tag = "Company Portal",
    operation_id = "getReceivedApplication",
    summary = "Get an application to one of the caller's internships",
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application with applicant details", body = ApplicationResponse),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal), fields(user_id = principal.user_id))]
pub async fn get_received_application(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let company = require_company(&state.db, &principal).await?;
    let (app, _) = find_company_application(&state.db, &company, id).await?;
    Ok(Json(
        present::application_response(&state.db, &state.config.server.public_url, app, true)
            .await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/applications/{id}/status",
    tag = "Company Portal",
    operation_id = "decideApplication",
    summary = "Accept or reject an application",
    description = "Allowed only for pending applications to the caller's own internships.",
    params(("id" = i32, Path, description = "Application ID")),
    request_body = UpdateApplicationStatusRequest,
    responses(
        (status = 200, description = "Decision recorded", body = ApplicationResponse),
        (status = 400, description = "Status not `accepted`/`rejected`, or already decided (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Application not found or not yours (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id))]
pub async fn decide_application(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateApplicationStatusRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let company = require_company(&state.db, &principal).await?;
    let (app, _) = find_company_application(&state.db, &company, id).await?;

    let next = app
        .status
        .transition(StatusActor::Company, payload.status)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut am: application::ActiveModel = app.into();
    am.status = Set(next);
    am.updated_at = Set(Utc::now());
    let app = am.update(&state.db).await?;

    tracing::info!(application_id = app.id, status = %next, "Application decided");

    Ok(Json(
        present::application_response(&state.db, &state.config.server.public_url, app, true)
            .await?,
    ))
}
