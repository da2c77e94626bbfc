// SeaORM entities
// One module per table; `prelude` re-exports them under
// `Entity` / `Model` / `ActiveModel` / `Column` aliases.

pub mod course;
pub mod profile;
pub mod section;
pub mod video;
pub mod video_comment;
pub mod video_progress;
pub mod video_resource;

#[cfg(test)]
mod tests;

pub use course::{CourseCategory, Tags};
pub use profile::Role;
pub use video_resource::ResourceKind;

pub mod prelude {
    pub use super::course::{
        ActiveModel as CourseActiveModel, Column as CourseColumn, Entity as Course,
        Model as CourseModel,
    };
    pub use super::profile::{
        ActiveModel as ProfileActiveModel, Column as ProfileColumn, Entity as Profile,
        Model as ProfileModel,
    };
    pub use super::section::{
        ActiveModel as SectionActiveModel, Column as SectionColumn, Entity as Section,
        Model as SectionModel,
    };
    pub use super::video::{
        ActiveModel as VideoActiveModel, Column as VideoColumn, Entity as Video,
        Model as VideoModel,
    };
    pub use super::video_comment::{
        ActiveModel as VideoCommentActiveModel, Column as VideoCommentColumn,
        Entity as VideoComment, Model as VideoCommentModel,
    };
    pub use super::video_progress::{
        ActiveModel as VideoProgressActiveModel, Column as VideoProgressColumn,
        Entity as VideoProgress, Model as VideoProgressModel,
    };
    pub use super::video_resource::{
        ActiveModel as VideoResourceActiveModel, Column as VideoResourceColumn,
        Entity as VideoResource, Model as VideoResourceModel,
    };
    pub use super::{CourseCategory, ResourceKind, Role, Tags};

    pub use sea_orm::{
        ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, Database,
        DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, ModelTrait, NotSet,
        PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    };
}
