use crate::ids::{CourseId, UserId};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    #[sea_orm(string_value = "programming")]
    Programming,
    #[sea_orm(string_value = "design")]
    Design,
    #[sea_orm(string_value = "business")]
    Business,
    #[sea_orm(string_value = "marketing")]
    Marketing,
    #[sea_orm(string_value = "personal_development")]
    PersonalDevelopment,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Free-form labels, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Tags(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub category: CourseCategory,
    pub thumbnail_url: Option<String>,
    pub tags: Tags,
    pub published: bool,
    pub created_by: UserId,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::section::Entity")]
    Section,
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
