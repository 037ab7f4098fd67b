use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::check_max_len;
use crate::entity::review;
use crate::error::{AppError, FieldErrors};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    /// Company whose reviews to list.
    pub company: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    #[schema(example = 3)]
    pub company_id: i32,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

pub fn validate_create_review(payload: &CreateReviewRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if !(1..=5).contains(&payload.rating) {
        errors.add("rating", "Rating must be between 1 and 5");
    }
    check_max_len("comment", &payload.comment, 5_000, &mut errors);
    errors.into_result()
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub company_id: i32,
    pub rating: i32,
    pub comment: String,
    pub is_anonymous: bool,
    pub is_verified: bool,
    /// `null` for anonymous reviews.
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewResponse {
    /// `author_name` is dropped when the review is anonymous.
    pub fn from_model(m: review::Model, author_name: Option<String>) -> Self {
        Self {
            id: m.id,
            company_id: m.company_id,
            rating: m.rating,
            comment: m.comment,
            is_anonymous: m.is_anonymous,
            is_verified: m.is_verified,
            author: if m.is_anonymous { None } else { author_name },
            created_at: m.created_at,
        }
    }
}
