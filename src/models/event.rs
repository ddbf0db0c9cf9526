use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_type")]
pub enum EventType {
    #[sea_orm(string_value = "pollution")]
    Pollution,
    #[sea_orm(string_value = "sighting")]
    Sighting,
    #[sea_orm(string_value = "bleaching")]
    Bleaching,
    #[sea_orm(string_value = "restoration")]
    Restoration,
    #[sea_orm(string_value = "monitoring")]
    Monitoring,
    #[sea_orm(string_value = "damage")]
    Damage,
}

impl EventType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pollution" => Some(EventType::Pollution),
            "sighting" => Some(EventType::Sighting),
            "bleaching" => Some(EventType::Bleaching),
            "restoration" => Some(EventType::Restoration),
            "monitoring" => Some(EventType::Monitoring),
            "damage" => Some(EventType::Damage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Pollution => "pollution",
            EventType::Sighting => "sighting",
            EventType::Bleaching => "bleaching",
            EventType::Restoration => "restoration",
            EventType::Monitoring => "monitoring",
            EventType::Damage => "damage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "severity")]
pub enum Severity {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reef_id: Uuid,
    pub event_type: EventType,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub event_date: ChronoDate,
    pub reported_by: Option<Uuid>,
    pub resolved: bool,
    pub notes: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reef::Entity",
        from = "Column::ReefId",
        to = "super::reef::Column::Id",
        on_delete = "Cascade"
    )]
    Reef,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReportedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    ReportedBy,
    #[sea_orm(has_many = "super::gallery_item::Entity")]
    GalleryItems,
}

impl Related<super::reef::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reef.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportedBy.def()
    }
}

impl Related<super::gallery_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GalleryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
