use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "article_category")]
pub enum ArticleCategory {
    #[sea_orm(string_value = "education")]
    Education,
    #[sea_orm(string_value = "research")]
    Research,
    #[sea_orm(string_value = "news")]
    News,
    #[sea_orm(string_value = "conservation")]
    Conservation,
    #[sea_orm(string_value = "restoration")]
    Restoration,
}

impl ArticleCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "education" => Some(ArticleCategory::Education),
            "research" => Some(ArticleCategory::Research),
            "news" => Some(ArticleCategory::News),
            "conservation" => Some(ArticleCategory::Conservation),
            "restoration" => Some(ArticleCategory::Restoration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleCategory::Education => "education",
            ArticleCategory::Research => "research",
            ArticleCategory::News => "news",
            ArticleCategory::Conservation => "conservation",
            ArticleCategory::Restoration => "restoration",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub category: ArticleCategory,
    pub content: String,
    pub excerpt: String,
    pub author: Option<Uuid>,
    pub published: bool,
    pub featured: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Author",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
