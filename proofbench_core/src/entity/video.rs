use crate::ids::{SectionId, VideoId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: VideoId,
    pub section_id: SectionId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    /// Length in seconds, when known.
    pub duration: Option<i32>,
    pub order_index: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::section::Entity",
        from = "Column::SectionId",
        to = "super::section::Column::Id"
    )]
    Section,
    #[sea_orm(has_many = "super::video_resource::Entity")]
    VideoResource,
    #[sea_orm(has_many = "super::video_progress::Entity")]
    VideoProgress,
    #[sea_orm(has_many = "super::video_comment::Entity")]
    VideoComment,
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl Related<super::video_resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoResource.def()
    }
}

impl Related<super::video_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoProgress.def()
    }
}

impl Related<super::video_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
