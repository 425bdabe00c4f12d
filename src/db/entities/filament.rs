//! Filament spool entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "filaments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand: String,
    pub color: String,
    pub material: String,
    pub weight: f64,              // grams, current
    pub initial_weight: f64,      // grams, at purchase
    pub cost: f64,
    pub purchase_date: String,    // YYYY-MM-DD
    pub photo: Option<Vec<u8>>,
    pub photo_mime: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::usage_log::Entity")]
    Logs,
}

impl Related<super::usage_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
