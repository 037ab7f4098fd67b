use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::institution::InstitutionResponse;
use super::shared::{check_email, check_max_len, check_required, double_option};
use crate::error::{AppError, FieldErrors};
use crate::utils::tags::TagList;

/// The calling student's own profile.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct StudentProfileResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub institution: Option<InstitutionResponse>,
    pub phone: String,
    #[schema(example = 3)]
    pub course: Option<i32>,
    pub specialization: String,
    pub bio: String,
    /// Absolute URL of the uploaded resume.
    pub resume_url: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub skills: TagList,
    #[schema(value_type = Vec<String>)]
    pub interests: TagList,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of the calling student's profile. Tag fields accept either a JSON
/// array or a comma-separated string.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateStudentProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `null` detaches the student from any institution.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub institution_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub course: Option<Option<i32>>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub skills: Option<TagList>,
    #[schema(value_type = Option<Vec<String>>)]
    pub interests: Option<TagList>,
}

pub fn validate_update_student_profile(
    payload: &UpdateStudentProfileRequest,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if let Some(first) = &payload.first_name {
        check_required("first_name", first, 150, &mut errors);
    }
    if let Some(last) = &payload.last_name {
        check_required("last_name", last, 150, &mut errors);
    }
    if let Some(email) = &payload.email {
        check_email("email", email, &mut errors);
    }
    if let Some(phone) = &payload.phone {
        check_max_len("phone", phone, 32, &mut errors);
    }
    check_course(payload.course.flatten(), &mut errors);
    if let Some(spec) = &payload.specialization {
        check_max_len("specialization", spec, 200, &mut errors);
    }
    if let Some(bio) = &payload.bio {
        check_max_len("bio", bio, 5_000, &mut errors);
    }
    if let Some(skills) = &payload.skills {
        skills.validate("skills", &mut errors);
    }
    if let Some(interests) = &payload.interests {
        interests.validate("interests", &mut errors);
    }
    errors.into_result()
}

pub(crate) fn check_course(course: Option<i32>, errors: &mut FieldErrors) {
    if let Some(course) = course
        && !(1..=6).contains(&course)
    {
        errors.add("course", "Course must be between 1 and 6");
    }
}
