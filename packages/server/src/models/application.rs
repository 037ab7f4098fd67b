use chrono::{DateTime, NaiveDate, Utc};
use common::ApplicationStatus;
use serde::{Deserialize, Serialize};

use super::shared::check_max_len;
use crate::entity::application;
use crate::error::{AppError, FieldErrors};
use crate::utils::tags::TagList;

/// Optional status filter for application listings.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationListQuery {
    pub status: Option<ApplicationStatus>,
    /// Restrict to one internship.
    pub internship: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateApplicationRequest {
    #[schema(example = 1)]
    pub internship_id: i32,
    #[serde(default)]
    #[schema(example = "interested")]
    pub comment: String,
}

pub fn validate_create_application(payload: &CreateApplicationRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_max_len("comment", &payload.comment, 5_000, &mut errors);
    errors.into_result()
}

/// Status change request. Students may only send `cancelled`;
/// companies may only send `accepted` or `rejected`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

/// Condensed internship embedded in an application.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationInternship {
    pub id: i32,
    pub position: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub company_id: i32,
    pub company_name: String,
}

/// Applicant details shown to the receiving company.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicantResponse {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub institution: Option<String>,
    pub course: Option<i32>,
    pub specialization: String,
    pub bio: String,
    pub resume_url: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub skills: TagList,
    #[schema(value_type = Vec<String>)]
    pub interests: TagList,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationResponse {
    #[schema(example = 12)]
    pub id: i32,
    pub status: ApplicationStatus,
    pub comment: String,
    pub internship: ApplicationInternship,
    /// Present only in company-facing views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<ApplicantResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationResponse {
    pub fn from_model(
        m: application::Model,
        internship: ApplicationInternship,
        student: Option<ApplicantResponse>,
    ) -> Self {
        Self {
            id: m.id,
            status: m.status,
            comment: m.comment,
            internship,
            student,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
