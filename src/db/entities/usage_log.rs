//! Usage log entity (append-only weight changes against a filament)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub filament_id: i32,     // FK to filaments
    pub change_amount: f64,   // negative = usage, positive = restock
    pub logged_at: i64,       // unix millis
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::filament::Entity",
        from = "Column::FilamentId",
        to = "super::filament::Column::Id",
        on_delete = "Cascade"
    )]
    Filament,
}

impl Related<super::filament::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Filament.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
