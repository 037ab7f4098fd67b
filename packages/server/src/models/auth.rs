use serde::{Deserialize, Serialize};

use super::company::check_coordinates;
use super::company::CompanyProfileResponse;
use super::shared::{
    check_email, check_max_len, check_password, check_required, check_username,
};
use super::student::{StudentProfileResponse, check_course};
use crate::entity::user::AccountRole;
use crate::error::{AppError, FieldErrors};
use crate::utils::tags::TagList;

/// Request body for student registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StudentRegisterRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub institution_id: Option<i32>,
    #[serde(default)]
    pub phone: String,
    pub course: Option<i32>,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub skills: TagList,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub interests: TagList,
}

pub fn validate_student_register(payload: &StudentRegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_username(&payload.username, &mut errors);
    check_email("email", &payload.email, &mut errors);
    check_password(&payload.password, &payload.password_confirm, &mut errors);
    check_max_len("first_name", &payload.first_name, 150, &mut errors);
    check_max_len("last_name", &payload.last_name, 150, &mut errors);
    check_max_len("phone", &payload.phone, 32, &mut errors);
    check_course(payload.course, &mut errors);
    check_max_len("specialization", &payload.specialization, 200, &mut errors);
    check_max_len("bio", &payload.bio, 5_000, &mut errors);
    payload.skills.validate("skills", &mut errors);
    payload.interests.validate("interests", &mut errors);
    errors
}

/// Request body for company registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CompanyRegisterRequest {
    #[schema(example = "acme")]
    pub username: String,
    /// Account email, also used for login recovery.
    #[schema(example = "hr@acme.example")]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[schema(example = "Acme Robotics")]
    pub company_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: String,
    /// Contact address for application notifications. Optional.
    pub contact_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub fn validate_company_register(payload: &CompanyRegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_username(&payload.username, &mut errors);
    check_email("email", &payload.email, &mut errors);
    check_password(&payload.password, &payload.password_confirm, &mut errors);
    check_required("company_name", &payload.company_name, 200, &mut errors);
    check_max_len("website", &payload.website, 200, &mut errors);
    check_max_len("address", &payload.address, 255, &mut errors);
    if let Some(contact) = &payload.contact_email {
        check_email("contact_email", contact, &mut errors);
    }
    check_coordinates(payload.latitude, payload.longitude, &mut errors);
    errors
}

/// Request body for login (both roles).
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if payload.username.trim().is_empty() {
        errors.add("username", "This field is required");
    }
    if payload.password.is_empty() {
        errors.add("password", "This field is required");
    }
    errors.into_result()
}

/// Either kind of profile, tagged by role.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ProfileResponse {
    Student(StudentProfileResponse),
    Company(CompanyProfileResponse),
}

/// Successful login response. The token is also set as the `session` cookie.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "alice")]
    pub username: String,
    pub role: AccountRole,
    pub profile: ProfileResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub username: Option<String>,
    pub role: Option<AccountRole>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CsrfResponse {
    /// Echo this value in the `X-CSRF-Token` header on state-changing requests.
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}
