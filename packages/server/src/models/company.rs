use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::internship::InternshipResponse;
use super::shared::{check_email, check_max_len, check_required, double_option};
use crate::entity::company;
use crate::error::{AppError, FieldErrors};

/// Query parameters for the public company listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompanyListQuery {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// `name` or `created_at`, prefix with `-` for descending. Defaults to `name`.
    pub ordering: Option<String>,
}

/// Public view of a company.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct CompanyResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Acme Robotics")]
    pub name: String,
    pub description: String,
    #[schema(example = "https://acme.example")]
    pub website: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Absolute URL of the uploaded logo.
    #[schema(example = "http://127.0.0.1:3000/api/v1/media/logos/ab/cdef.png")]
    pub logo_url: Option<String>,
    pub is_verified: bool,
    pub has_blue_checkmark: bool,
    /// Mean review rating, `null` when the company has no reviews.
    #[schema(example = 4.5)]
    pub rating: Option<f64>,
    pub reviews_count: u64,
}

impl CompanyResponse {
    pub fn from_model(m: company::Model, logo_url: Option<String>, rating: RatingSummary) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            website: m.website,
            address: m.address,
            latitude: m.latitude,
            longitude: m.longitude,
            logo_url,
            is_verified: m.is_verified,
            has_blue_checkmark: m.has_blue_checkmark,
            rating: rating.average(),
            reviews_count: rating.count,
        }
    }
}

/// Running aggregate of review ratings for one company.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RatingSummary {
    pub total: i64,
    pub count: u64,
}

impl RatingSummary {
    pub fn add(&mut self, rating: i32) {
        self.total += i64::from(rating);
        self.count += 1;
    }

    /// Mean rating rounded to two decimals.
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let mean = self.total as f64 / self.count as f64;
        Some((mean * 100.0).round() / 100.0)
    }
}

/// A company together with its currently listed internships.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyWithInternshipsResponse {
    #[serde(flatten)]
    pub company: CompanyResponse,
    pub internships: Vec<InternshipResponse>,
}

/// The calling company's own profile, including private fields.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyProfileResponse {
    #[serde(flatten)]
    pub company: CompanyResponse,
    #[schema(example = "acme")]
    pub username: String,
    #[schema(example = "hr@acme.example")]
    pub account_email: String,
    /// Address that receives application notifications.
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update of the calling company's profile. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCompanyProfileRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    /// `null` clears the contact address.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<Option<f64>>,
}

pub fn validate_update_company_profile(payload: &UpdateCompanyProfileRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if let Some(name) = &payload.name {
        check_required("name", name, 200, &mut errors);
    }
    if let Some(website) = &payload.website {
        check_max_len("website", website, 200, &mut errors);
    }
    if let Some(address) = &payload.address {
        check_max_len("address", address, 255, &mut errors);
    }
    if let Some(Some(email)) = &payload.email {
        check_email("email", email, &mut errors);
    }
    check_coordinates(
        payload.latitude.flatten(),
        payload.longitude.flatten(),
        &mut errors,
    );
    errors.into_result()
}

pub(crate) fn check_coordinates(lat: Option<f64>, lng: Option<f64>, errors: &mut FieldErrors) {
    if let Some(lat) = lat
        && !(-90.0..=90.0).contains(&lat)
    {
        errors.add("latitude", "Latitude must be between -90 and 90");
    }
    if let Some(lng) = lng
        && !(-180.0..=180.0).contains(&lng)
    {
        errors.add("longitude", "Longitude must be between -180 and 180");
    }
}
