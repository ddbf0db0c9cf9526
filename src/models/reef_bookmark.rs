use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (user, reef) pair; the pair carries a unique index so a
/// duplicate bookmark is rejected by the database even if the application
/// check races.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reef_bookmarks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub reef_id: Uuid,
    pub notes: String,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::reef::Entity",
        from = "Column::ReefId",
        to = "super::reef::Column::Id",
        on_delete = "Cascade"
    )]
    Reef,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::reef::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reef.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
