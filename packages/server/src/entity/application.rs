use common::ApplicationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "student_internship")]
    pub student_id: i32,
    #[sea_orm(unique_key = "student_internship")]
    pub internship_id: i32,
    /// Copied from the internship when the application is created.
    pub company_id: i32,

    pub status: ApplicationStatus,
    #[sea_orm(column_type = "Text")]
    pub comment: String,

    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,
    #[sea_orm(belongs_to, from = "internship_id", to = "id")]
    pub internship: HasOne<super::internship::Entity>,
    #[sea_orm(belongs_to, from = "company_id", to = "id")]
    pub company: HasOne<super::company::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
