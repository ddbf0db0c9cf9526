use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reef_region")]
pub enum ReefRegion {
    #[sea_orm(string_value = "caribbean")]
    Caribbean,
    #[sea_orm(string_value = "pacific")]
    Pacific,
    #[sea_orm(string_value = "indian")]
    Indian,
    #[sea_orm(string_value = "red_sea")]
    RedSea,
    #[sea_orm(string_value = "atlantic")]
    Atlantic,
}

impl ReefRegion {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "caribbean" => Some(ReefRegion::Caribbean),
            "pacific" => Some(ReefRegion::Pacific),
            "indian" => Some(ReefRegion::Indian),
            "red_sea" => Some(ReefRegion::RedSea),
            "atlantic" => Some(ReefRegion::Atlantic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReefRegion::Caribbean => "caribbean",
            ReefRegion::Pacific => "pacific",
            ReefRegion::Indian => "indian",
            ReefRegion::RedSea => "red_sea",
            ReefRegion::Atlantic => "atlantic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "health_status")]
pub enum HealthStatus {
    #[sea_orm(string_value = "excellent")]
    Excellent,
    #[sea_orm(string_value = "good")]
    Good,
    #[sea_orm(string_value = "fair")]
    Fair,
    #[sea_orm(string_value = "poor")]
    Poor,
    #[sea_orm(string_value = "critical")]
    Critical,
}

impl HealthStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "excellent" => Some(HealthStatus::Excellent),
            "good" => Some(HealthStatus::Good),
            "fair" => Some(HealthStatus::Fair),
            "poor" => Some(HealthStatus::Poor),
            "critical" => Some(HealthStatus::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Fair => "fair",
            HealthStatus::Poor => "poor",
            HealthStatus::Critical => "critical",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reefs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub region: ReefRegion,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub area_km2: f64,
    pub depth_meters: f64,
    pub health_status: HealthStatus,
    pub created_by: Option<Uuid>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    CreatedBy,
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
    #[sea_orm(has_many = "super::gallery_item::Entity")]
    GalleryItems,
    #[sea_orm(has_many = "super::reef_bookmark::Entity")]
    Bookmarks,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedBy.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::gallery_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GalleryItems.def()
    }
}

impl Related<super::reef_bookmark::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmarks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
