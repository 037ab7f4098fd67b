use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// NULL for companies created by seeding rather than registration.
    #[sea_orm(unique)]
    pub user_id: Option<i32>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub website: String,
    pub address: String,
    /// Contact address for application notifications.
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Storage key of the uploaded logo.
    pub logo: Option<String>,

    /// Set by moderators; unverified companies are hidden from public listings.
    pub is_verified: bool,
    pub is_active: bool,
    pub has_blue_checkmark: bool,

    #[sea_orm(has_many)]
    pub internships: HasMany<super::internship::Entity>,

    #[sea_orm(has_many)]
    pub applications: HasMany<super::application::Entity>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether the company may appear in public listings.
    pub fn is_listed(&self) -> bool {
        self.is_verified && self.is_active
    }
}

impl ActiveModelBehavior for ActiveModel {}
