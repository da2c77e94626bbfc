use crate::ids::UserId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authorization role. Ordered from least to most privileged.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum,
    Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "superadmin")]
    SuperAdmin,
}

impl Role {
    /// Admins and super admins.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_super_admin(self) -> bool {
        self == Role::SuperAdmin
    }

    pub fn is_student(self) -> bool {
        self == Role::Student
    }

    pub fn has_role(self, allowed: &[Role]) -> bool {
        allowed.contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Admin => "Admin",
            Role::SuperAdmin => "Super Admin",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: UserId,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::video_comment::Entity")]
    VideoComment,
    #[sea_orm(has_many = "super::video_progress::Entity")]
    VideoProgress,
}

impl Related<super::video_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoComment.def()
    }
}

impl Related<super::video_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoProgress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
