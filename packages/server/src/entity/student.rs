use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub institution_id: Option<i32>,
    #[sea_orm(belongs_to, from = "institution_id", to = "id")]
    pub institution: HasOne<super::institution::Entity>,

    pub phone: String,
    pub course: Option<i32>,
    pub specialization: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    /// Storage key of the uploaded resume.
    pub resume: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub skills: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub interests: Json,

    pub is_active: bool,

    #[sea_orm(has_many)]
    pub applications: HasMany<super::application::Entity>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
