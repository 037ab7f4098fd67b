use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "internship")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub company_id: i32,
    #[sea_orm(belongs_to, from = "company_id", to = "id")]
    pub company: HasOne<super::company::Entity>,

    pub position: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub location: String,
    pub start_date: Date,
    pub end_date: Date,
    #[sea_orm(column_type = "Text")]
    pub requirements: String,

    /// Technology tags stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tech_stack: Json,

    pub available_positions: i32,
    pub is_active: bool,

    #[sea_orm(has_many, via = "internship_institution")]
    pub institutions: HasMany<super::institution::Entity>,

    #[sea_orm(has_many)]
    pub applications: HasMany<super::application::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
