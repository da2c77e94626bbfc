//! Repository seams over the persistent store.
//!
//! Services only ever see these traits; [`DatabaseStore`] implements all of
//! them on a sea-orm connection. Each method is a single round trip with no
//! grouping across calls, except the reorder operations which run in one
//! transaction.

mod database;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use database::DatabaseStore;

use crate::{
    entity::prelude::*,
    error::StoreError,
    ids::{CommentId, CourseId, ProgressId, ResourceId, SectionId, UserId, VideoId},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFilter {
    pub category: Option<CourseCategory>,
    pub published: Option<bool>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    pub created_by: Option<UserId>,
}

impl CourseFilter {
    pub fn published() -> Self {
        Self {
            published: Some(true),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub category: CourseCategory,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<CourseCategory>,
    pub thumbnail_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionChanges {
    pub name: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub duration: Option<i32>,
    /// Appended after the last video of the section when absent.
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

/// Values written to a progress row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub last_position: i32,
    pub watch_percentage: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Author display fields joined onto a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
}

impl From<ProfileModel> for AuthorSummary {
    fn from(profile: ProfileModel) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            role: profile.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: VideoCommentModel,
    /// `None` when the author's profile no longer exists.
    pub author: Option<AuthorSummary>,
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Newest first.
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<CourseModel>, StoreError>;
    async fn find_course(&self, id: CourseId) -> Result<Option<CourseModel>, StoreError>;
    async fn insert_course(
        &self,
        created_by: UserId,
        course: NewCourse,
    ) -> Result<CourseModel, StoreError>;
    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Option<CourseModel>, StoreError>;
    /// Cascades to sections, videos and everything hanging off them.
    async fn delete_course(&self, id: CourseId) -> Result<bool, StoreError>;

    /// Ordered by `order_index`.
    async fn list_sections(&self, course_id: CourseId) -> Result<Vec<SectionModel>, StoreError>;
    async fn find_section(&self, id: SectionId) -> Result<Option<SectionModel>, StoreError>;
    async fn find_sections(&self, ids: &[SectionId]) -> Result<Vec<SectionModel>, StoreError>;
    async fn insert_section(
        &self,
        course_id: CourseId,
        name: String,
        order_index: i32,
    ) -> Result<SectionModel, StoreError>;
    async fn update_section(
        &self,
        id: SectionId,
        changes: SectionChanges,
    ) -> Result<Option<SectionModel>, StoreError>;
    async fn delete_section(&self, id: SectionId) -> Result<bool, StoreError>;
    /// Assigns each listed section its position in `ordered`.
    async fn reorder_sections(
        &self,
        course_id: CourseId,
        ordered: &[SectionId],
    ) -> Result<(), StoreError>;

    /// Videos of all given sections, ordered by `order_index`.
    async fn list_videos(&self, section_ids: &[SectionId]) -> Result<Vec<VideoModel>, StoreError>;
    async fn find_video(&self, id: VideoId) -> Result<Option<VideoModel>, StoreError>;
    async fn find_videos(&self, ids: &[VideoId]) -> Result<Vec<VideoModel>, StoreError>;
    async fn insert_video(
        &self,
        section_id: SectionId,
        video: NewVideo,
        order_index: i32,
    ) -> Result<VideoModel, StoreError>;
    async fn update_video(
        &self,
        id: VideoId,
        changes: VideoChanges,
    ) -> Result<Option<VideoModel>, StoreError>;
    async fn delete_video(&self, id: VideoId) -> Result<bool, StoreError>;
    async fn reorder_videos(
        &self,
        section_id: SectionId,
        ordered: &[VideoId],
    ) -> Result<(), StoreError>;

    async fn list_resources(
        &self,
        video_ids: &[VideoId],
    ) -> Result<Vec<VideoResourceModel>, StoreError>;
    async fn insert_resource(
        &self,
        video_id: VideoId,
        resource: NewResource,
    ) -> Result<VideoResourceModel, StoreError>;
    async fn delete_resource(&self, id: ResourceId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn find_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<VideoProgressModel>, StoreError>;
    async fn list_progress_for_videos(
        &self,
        user_id: UserId,
        video_ids: &[VideoId],
    ) -> Result<Vec<VideoProgressModel>, StoreError>;
    /// Most recently watched first.
    async fn list_progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<VideoProgressModel>, StoreError>;
    async fn insert_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
        update: ProgressUpdate,
    ) -> Result<VideoProgressModel, StoreError>;
    async fn update_progress(
        &self,
        id: ProgressId,
        update: ProgressUpdate,
    ) -> Result<VideoProgressModel, StoreError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Oldest first.
    async fn list_comments(&self, video_id: VideoId) -> Result<Vec<CommentWithAuthor>, StoreError>;
    async fn find_comment(&self, id: CommentId) -> Result<Option<VideoCommentModel>, StoreError>;
    async fn insert_comment(
        &self,
        video_id: VideoId,
        user_id: UserId,
        parent_id: Option<CommentId>,
        content: String,
    ) -> Result<VideoCommentModel, StoreError>;
    async fn update_comment(
        &self,
        id: CommentId,
        content: String,
    ) -> Result<Option<VideoCommentModel>, StoreError>;
    /// Replies go with their parent.
    async fn delete_comment(&self, id: CommentId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, id: UserId) -> Result<Option<ProfileModel>, StoreError>;
    async fn insert_profile(&self, profile: NewProfile) -> Result<ProfileModel, StoreError>;
    async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<ProfileModel>, StoreError>;
    async fn update_role(&self, id: UserId, role: Role)
        -> Result<Option<ProfileModel>, StoreError>;
    /// Newest first, optionally restricted to one role.
    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<ProfileModel>, StoreError>;
}
