use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use common::{ApplicationStatus, StatusActor};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{application, company, internship};
use crate::error::{AppError, ErrorBody, conflict_on_unique};
use crate::extractors::auth::Principal;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::application::{
    ApplicationListQuery, ApplicationResponse, CreateApplicationRequest,
    UpdateApplicationStatusRequest, validate_create_application,
};
use crate::notify::notify_company_of_application;
use crate::state::AppState;
use crate::utils::access::{find_student_application, require_student};
use crate::utils::present;

const DUPLICATE_APPLICATION: &str = "You have already applied to this internship";

#[utoipa::path(
    get,
    path = "/",
    tag = "Applications",
    operation_id = "listMyApplications",
    summary = "List the caller's applications",
    params(ApplicationListQuery),
    responses(
        (status = 200, description = "Applications, newest first", body = Vec<ApplicationResponse>),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no student profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, query), fields(user_id = principal.user_id))]
pub async fn list_applications(
    principal: Principal,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ApplicationListQuery>,
) -> Result<Json<Vec<ApplicationResponse>>, AppError> {
    let student = require_student(&state.db, &principal).await?;

    let mut select = application::Entity::find()
        .filter(application::Column::StudentId.eq(student.id));
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
        present::application_responses(&state.db, &state.config.server.public_url, rows, false)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Applications",
    operation_id = "createApplication",
    summary = "Apply to an internship",
    description = "Creates a pending application for the caller. The company is taken from the \
        internship. The company is then emailed on a best-effort basis; delivery problems never \
        fail the request. A student can apply to an internship only once.",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application created", body = ApplicationResponse),
        (status = 400, description = "Invalid body or duplicate application (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "No student profile, or internship not open (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id, internship_id = payload.internship_id))]
pub async fn create_application(
    principal: Principal,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_application(&payload)?;
    let student = require_student(&state.db, &principal).await?;

    let not_open = || AppError::NotFound("Internship not found".into());
    let internship = internship::Entity::find_by_id(payload.internship_id)
        .one(&state.db)
        .await?
        .filter(|i| i.is_active)
        .ok_or_else(not_open)?;
    let owner = company::Entity::find_by_id(internship.company_id)
        .one(&state.db)
        .await?
        .filter(company::Model::is_listed)
        .ok_or_else(not_open)?;

    let existing = application::Entity::find()
        .filter(application::Column::StudentId.eq(student.id))
        .filter(application::Column::InternshipId.eq(internship.id))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(DUPLICATE_APPLICATION.into()));
    }

    let now = Utc::now();
    let created = application::ActiveModel {
        student_id: Set(student.id),
        internship_id: Set(internship.id),
        company_id: Set(owner.id),
        status: Set(ApplicationStatus::Pending),
        comment: Set(payload.comment.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_APPLICATION))?;

    tracing::info!(application_id = created.id, company_id = owner.id, "Application submitted");

    let outcome = notify_company_of_application(
        &state.db,
        &*state.mailer,
        &state.config.server.public_url,
        &created,
    )
    .await;
    tracing::debug!(?outcome, "Notification attempted");

    let body =
        present::application_response(&state.db, &state.config.server.public_url, created, false)
            .await?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Applications",
    operation_id = "getMyApplication",
    summary = "Get one of the caller's applications",
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application", body = ApplicationResponse),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal), fields(user_id = principal.user_id))]
pub async fn get_application(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let student = require_student(&state.db, &principal).await?;
    let app = find_student_application(&state.db, &student, id).await?;
    Ok(Json(
        present::application_response(&state.db, &state.config.server.public_url, app, false)
            .await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Applications",
    operation_id = "cancelApplication",
    summary = "Cancel one of the caller's applications",
    description = "The only accepted status is `cancelled`, allowed from any current state.",
    params(("id" = i32, Path, description = "Application ID")),
    request_body = UpdateApplicationStatusRequest,
    responses(
        (status = 200, description = "Application cancelled", body = ApplicationResponse),
        (status = 400, description = "Status other than `cancelled` (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id))]
pub async fn update_application(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateApplicationStatusRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let student = require_student(&state.db, &principal).await?;
    let app = find_student_application(&state.db, &student, id).await?;

    let next = app
        .status
        .transition(StatusActor::Student, payload.status)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut am: application::ActiveModel = app.into();
    am.status = Set(next);
    am.updated_at = Set(Utc::now());
    let app = am.update(&state.db).await?;

    tracing::info!(application_id = app.id, status = %next, "Application cancelled");

    Ok(Json(
        present::application_response(&state.db, &state.config.server.public_url, app, false)
            .await?,
    ))
}
