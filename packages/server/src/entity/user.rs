use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which kind of profile a credential account is linked to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "company")]
    Company,
}

/// Credential account shared by students and companies.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AccountRole,

    #[sea_orm(has_many)]
    pub sessions: HasMany<super::session::Entity>,

    #[sea_orm(has_one)]
    pub student: HasOne<super::student::Entity>,

    #[sea_orm(has_one)]
    pub company: HasOne<super::company::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl ActiveModelBehavior for ActiveModel {}
