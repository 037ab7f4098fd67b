use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::company::CompanyResponse;
use super::institution::InstitutionResponse;
use super::shared::{check_max_len, check_required};
use crate::entity::internship;
use crate::error::{AppError, FieldErrors};
use crate::utils::tags::TagList;

/// Query constraints accepted by the internship listing and its derived views.
#[derive(Clone, Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InternshipListQuery {
    /// Owning company id.
    pub company: Option<i32>,
    /// Case-insensitive company-name substring.
    pub company_name: Option<String>,
    /// Case-insensitive location substring.
    pub location: Option<String>,
    /// Institution id the internship must be offered to.
    pub institution: Option<i32>,
    /// Comma-separated technologies; any match qualifies.
    #[param(example = "Python,Go")]
    pub tech_stack: Option<String>,
    /// Case-insensitive substring over position, description, location and company name.
    pub search: Option<String>,
    /// One of `start_date`, `end_date`, `created_at`, optionally prefixed with `-`.
    #[param(example = "-created_at")]
    pub ordering: Option<String>,
}

/// Public view of an internship with its company and institutions embedded.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct InternshipResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub company: CompanyResponse,
    #[schema(example = "Backend Intern")]
    pub position: String,
    pub description: String,
    #[schema(example = "Berlin")]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub requirements: String,
    #[schema(value_type = Vec<String>, example = json!(["Rust", "PostgreSQL"]))]
    pub tech_stack: TagList,
    pub available_positions: i32,
    pub institutions: Vec<InstitutionResponse>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InternshipResponse {
    pub fn from_model(
        m: internship::Model,
        company: CompanyResponse,
        institutions: Vec<InstitutionResponse>,
    ) -> Self {
        Self {
            id: m.id,
            company,
            tech_stack: TagList::from_json(&m.tech_stack),
            position: m.position,
            description: m.description,
            location: m.location,
            start_date: m.start_date,
            end_date: m.end_date,
            requirements: m.requirements,
            available_positions: m.available_positions,
            institutions,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Body for creating an internship as the calling company.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateInternshipRequest {
    #[schema(example = "Backend Intern")]
    pub position: String,
    #[serde(default)]
    pub description: String,
    #[schema(example = "Berlin")]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub requirements: String,
    /// JSON array or comma-separated string.
    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["Rust", "PostgreSQL"]))]
    pub tech_stack: TagList,
    #[serde(default = "default_positions")]
    #[schema(example = 2)]
    pub available_positions: i32,
    #[serde(default)]
    pub institution_ids: Vec<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_positions() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

pub fn validate_create_internship(payload: &CreateInternshipRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_fields(
        Some(&payload.position),
        Some(&payload.location),
        Some(&payload.description),
        Some(&payload.requirements),
        Some(payload.available_positions),
        Some(&payload.tech_stack),
        &mut errors,
    );
    check_dates(payload.start_date, payload.end_date, &mut errors);
    errors.into_result()
}

/// Partial update of an internship. Absent fields are left untouched;
/// `institution_ids`, when present, replaces the whole set.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateInternshipRequest {
    pub position: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub requirements: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tech_stack: Option<TagList>,
    pub available_positions: Option<i32>,
    pub institution_ids: Option<Vec<i32>>,
    pub is_active: Option<bool>,
}

/// Validate an update against the stored row so the merged date range stays ordered.
pub fn validate_update_internship(
    payload: &UpdateInternshipRequest,
    current: &internship::Model,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_fields(
        payload.position.as_ref(),
        payload.location.as_ref(),
        payload.description.as_ref(),
        payload.requirements.as_ref(),
        payload.available_positions,
        payload.tech_stack.as_ref(),
        &mut errors,
    );
    check_dates(
        payload.start_date.unwrap_or(current.start_date),
        payload.end_date.unwrap_or(current.end_date),
        &mut errors,
    );
    errors.into_result()
}

fn check_fields(
    position: Option<&String>,
    location: Option<&String>,
    description: Option<&String>,
    requirements: Option<&String>,
    available_positions: Option<i32>,
    tech_stack: Option<&TagList>,
    errors: &mut FieldErrors,
) {
    if let Some(position) = position {
        check_required("position", position, 200, errors);
    }
    if let Some(location) = location {
        check_required("location", location, 200, errors);
    }
    if let Some(description) = description {
        check_max_len("description", description, 10_000, errors);
    }
    if let Some(requirements) = requirements {
        check_max_len("requirements", requirements, 10_000, errors);
    }
    if let Some(n) = available_positions
        && n < 1
    {
        errors.add("available_positions", "Must be at least 1");
    }
    if let Some(tags) = tech_stack {
        tags.validate("tech_stack", errors);
    }
}

fn check_dates(start: NaiveDate, end: NaiveDate, errors: &mut FieldErrors) {
    if end < start {
        errors.add("end_date", "End date must not be before start date");
    }
}
