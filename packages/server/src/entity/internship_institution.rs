use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "internship_institution")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub internship_id: i32,
    #[sea_orm(primary_key)]
    pub institution_id: i32,
    #[sea_orm(belongs_to, from = "internship_id", to = "id")]
    pub internship: HasOne<super::internship::Entity>,
    #[sea_orm(belongs_to, from = "institution_id", to = "id")]
    pub institution: HasOne<super::institution::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
