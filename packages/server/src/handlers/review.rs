use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{company, review};
use crate::error::{AppError, ErrorBody, conflict_on_unique};
use crate::extractors::auth::Principal;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::review::{
    CreateReviewRequest, ReviewListQuery, ReviewResponse, validate_create_review,
};
use crate::state::AppState;
use crate::utils::access::require_student;
use crate::utils::present;

const DUPLICATE_REVIEW: &str = "You have already reviewed this company";

#[utoipa::path(
    get,
    path = "/",
    tag = "Reviews",
    operation_id = "listReviews",
    summary = "List company reviews",
    description = "Newest first. Filter with `company`. Anonymous reviews have a `null` author.",
    params(ReviewListQuery),
    responses((status = 200, description = "Reviews", body = Vec<ReviewResponse>)),
)]
#[instrument(skip(state, query))]
pub async fn list_reviews(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReviewListQuery>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let mut select = review::Entity::find();
    if let Some(company_id) = query.company {
        select = select.filter(review::Column::CompanyId.eq(company_id));
    }
    let rows = select
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(present::review_responses(&state.db, rows).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Reviews",
    operation_id = "createReview",
    summary = "Review a company",
    description = "One review per student and company.",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid body or duplicate review (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "No student profile, or company not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id, company_id = payload.company_id))]
pub async fn create_review(
    principal: Principal,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_review(&payload)?;
    let student = require_student(&state.db, &principal).await?;

    let target = company::Entity::find_by_id(payload.company_id)
        .one(&state.db)
        .await?
        .filter(company::Model::is_listed)
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

    let created = review::ActiveModel {
        student_id: Set(student.id),
        company_id: Set(target.id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.trim().to_string()),
        is_anonymous: Set(payload.is_anonymous),
        is_verified: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_REVIEW))?;

    let body = present::review_responses(&state.db, vec![created])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("review response missing".into()))?;
    Ok((StatusCode::CREATED, Json(body)))
}
