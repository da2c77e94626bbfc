use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};

use crate::{
    entity::prelude::*,
    error::StoreError,
    ids::{CommentId, CourseId, ProgressId, ResourceId, SectionId, UserId, VideoId},
};

use super::{
    CommentRepository, CommentWithAuthor, CourseChanges, CourseFilter, CourseRepository,
    NewCourse, NewProfile, NewResource, NewVideo, ProfileChanges, ProfileRepository,
    ProgressRepository, ProgressUpdate, SectionChanges, VideoChanges,
};

/// Repository implementation backed by a sea-orm connection.
#[derive(Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl CourseRepository for DatabaseStore {
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<CourseModel>, StoreError> {
        let mut query = Course::find()
            .order_by_desc(CourseColumn::CreatedAt)
            .order_by_desc(CourseColumn::Id);

        if let Some(category) = filter.category {
            query = query.filter(CourseColumn::Category.eq(category));
        }
        if let Some(published) = filter.published {
            query = query.filter(CourseColumn::Published.eq(published));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(Expr::expr(Func::lower(Expr::col(CourseColumn::Title))).like(pattern));
        }
        if let Some(created_by) = filter.created_by {
            query = query.filter(CourseColumn::CreatedBy.eq(created_by));
        }

        Ok(query.all(&self.db).await?)
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<CourseModel>, StoreError> {
        Ok(Course::find_by_id(id).one(&self.db).await?)
    }

    async fn insert_course(
        &self,
        created_by: UserId,
        course: NewCourse,
    ) -> Result<CourseModel, StoreError> {
        let now = Utc::now();
        let course = CourseActiveModel {
            id: Set(CourseId::new()),
            title: Set(course.title),
            description: Set(course.description),
            category: Set(course.category),
            thumbnail_url: Set(course.thumbnail_url),
            tags: Set(Tags(course.tags)),
            published: Set(course.published),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(course.insert(&self.db).await?)
    }

    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Option<CourseModel>, StoreError> {
        let Some(course) = Course::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        // Only update fields that were provided
        let mut course: CourseActiveModel = course.into();
        if let Some(title) = changes.title {
            course.title = Set(title);
        }
        if let Some(description) = changes.description {
            course.description = Set(Some(description));
        }
        if let Some(category) = changes.category {
            course.category = Set(category);
        }
        if let Some(thumbnail_url) = changes.thumbnail_url {
            course.thumbnail_url = Set(Some(thumbnail_url));
        }
        if let Some(tags) = changes.tags {
            course.tags = Set(Tags(tags));
        }
        if let Some(published) = changes.published {
            course.published = Set(published);
        }
        course.updated_at = Set(Utc::now());

        Ok(Some(course.update(&self.db).await?))
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool, StoreError> {
        let result = Course::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_sections(&self, course_id: CourseId) -> Result<Vec<SectionModel>, StoreError> {
        let sections = Section::find()
            .filter(SectionColumn::CourseId.eq(course_id))
            .order_by_asc(SectionColumn::OrderIndex)
            .order_by_asc(SectionColumn::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(sections)
    }

    async fn find_section(&self, id: SectionId) -> Result<Option<SectionModel>, StoreError> {
        Ok(Section::find_by_id(id).one(&self.db).await?)
    }

    async fn find_sections(&self, ids: &[SectionId]) -> Result<Vec<SectionModel>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sections = Section::find()
            .filter(SectionColumn::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(sections)
    }

    async fn insert_section(
        &self,
        course_id: CourseId,
        name: String,
        order_index: i32,
    ) -> Result<SectionModel, StoreError> {
        let now = Utc::now();
        let section = SectionActiveModel {
            id: Set(SectionId::new()),
            course_id: Set(course_id),
            name: Set(name),
            order_index: Set(order_index),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(section.insert(&self.db).await?)
    }

    async fn update_section(
        &self,
        id: SectionId,
        changes: SectionChanges,
    ) -> Result<Option<SectionModel>, StoreError> {
        let Some(section) = Section::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut section: SectionActiveModel = section.into();
        if let Some(name) = changes.name {
            section.name = Set(name);
        }
        if let Some(order_index) = changes.order_index {
            section.order_index = Set(order_index);
        }
        section.updated_at = Set(Utc::now());

        Ok(Some(section.update(&self.db).await?))
    }

    async fn delete_section(&self, id: SectionId) -> Result<bool, StoreError> {
        let result = Section::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn reorder_sections(
        &self,
        course_id: CourseId,
        ordered: &[SectionId],
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        for (index, section_id) in ordered.iter().enumerate() {
            Section::update_many()
                .col_expr(SectionColumn::OrderIndex, Expr::value(index as i32))
                .col_expr(SectionColumn::UpdatedAt, Expr::value(now))
                .filter(SectionColumn::Id.eq(*section_id))
                .filter(SectionColumn::CourseId.eq(course_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn list_videos(&self, section_ids: &[SectionId]) -> Result<Vec<VideoModel>, StoreError> {
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }

        let videos = Video::find()
            .filter(VideoColumn::SectionId.is_in(section_ids.iter().copied()))
            .order_by_asc(VideoColumn::OrderIndex)
            .order_by_asc(VideoColumn::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(videos)
    }

    async fn find_video(&self, id: VideoId) -> Result<Option<VideoModel>, StoreError> {
        Ok(Video::find_by_id(id).one(&self.db).await?)
    }

    async fn find_videos(&self, ids: &[VideoId]) -> Result<Vec<VideoModel>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let videos = Video::find()
            .filter(VideoColumn::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(videos)
    }

    async fn insert_video(
        &self,
        section_id: SectionId,
        video: NewVideo,
        order_index: i32,
    ) -> Result<VideoModel, StoreError> {
        let now = Utc::now();
        let video = VideoActiveModel {
            id: Set(VideoId::new()),
            section_id: Set(section_id),
            title: Set(video.title),
            description: Set(video.description),
            video_url: Set(video.video_url),
            duration: Set(video.duration),
            order_index: Set(order_index),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(video.insert(&self.db).await?)
    }

    async fn update_video(
        &self,
        id: VideoId,
        changes: VideoChanges,
    ) -> Result<Option<VideoModel>, StoreError> {
        let Some(video) = Video::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut video: VideoActiveModel = video.into();
        if let Some(title) = changes.title {
            video.title = Set(title);
        }
        if let Some(description) = changes.description {
            video.description = Set(Some(description));
        }
        if let Some(video_url) = changes.video_url {
            video.video_url = Set(video_url);
        }
        if let Some(duration) = changes.duration {
            video.duration = Set(Some(duration));
        }
        if let Some(order_index) = changes.order_index {
            video.order_index = Set(order_index);
        }
        video.updated_at = Set(Utc::now());

        Ok(Some(video.update(&self.db).await?))
    }

    async fn delete_video(&self, id: VideoId) -> Result<bool, StoreError> {
        let result = Video::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn reorder_videos(
        &self,
        section_id: SectionId,
        ordered: &[VideoId],
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        for (index, video_id) in ordered.iter().enumerate() {
            Video::update_many()
                .col_expr(VideoColumn::OrderIndex, Expr::value(index as i32))
                .col_expr(VideoColumn::UpdatedAt, Expr::value(now))
                .filter(VideoColumn::Id.eq(*video_id))
                .filter(VideoColumn::SectionId.eq(section_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn list_resources(
        &self,
        video_ids: &[VideoId],
    ) -> Result<Vec<VideoResourceModel>, StoreError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let resources = VideoResource::find()
            .filter(VideoResourceColumn::VideoId.is_in(video_ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(resources)
    }

    async fn insert_resource(
        &self,
        video_id: VideoId,
        resource: NewResource,
    ) -> Result<VideoResourceModel, StoreError> {
        let resource = VideoResourceActiveModel {
            id: Set(ResourceId::new()),
            video_id: Set(video_id),
            title: Set(resource.title),
            url: Set(resource.url),
            kind: Set(resource.kind),
            created_at: Set(Utc::now()),
        };

        Ok(resource.insert(&self.db).await?)
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<bool, StoreError> {
        let result = VideoResource::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl ProgressRepository for DatabaseStore {
    async fn find_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<VideoProgressModel>, StoreError> {
        let progress = VideoProgress::find()
            .filter(VideoProgressColumn::UserId.eq(user_id))
            .filter(VideoProgressColumn::VideoId.eq(video_id))
            .one(&self.db)
            .await?;

        Ok(progress)
    }

    async fn list_progress_for_videos(
        &self,
        user_id: UserId,
        video_ids: &[VideoId],
    ) -> Result<Vec<VideoProgressModel>, StoreError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let progress = VideoProgress::find()
            .filter(VideoProgressColumn::UserId.eq(user_id))
            .filter(VideoProgressColumn::VideoId.is_in(video_ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(progress)
    }

    async fn list_progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<VideoProgressModel>, StoreError> {
        let progress = VideoProgress::find()
            .filter(VideoProgressColumn::UserId.eq(user_id))
            .order_by_desc(VideoProgressColumn::LastWatchedAt)
            .all(&self.db)
            .await?;

        Ok(progress)
    }

    async fn insert_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
        update: ProgressUpdate,
    ) -> Result<VideoProgressModel, StoreError> {
        let now = Utc::now();
        let progress = VideoProgressActiveModel {
            id: Set(ProgressId::new()),
            user_id: Set(user_id),
            video_id: Set(video_id),
            last_position: Set(update.last_position),
            watch_percentage: Set(update.watch_percentage),
            completed: Set(update.completed),
            last_watched_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(progress.insert(&self.db).await?)
    }

    async fn update_progress(
        &self,
        id: ProgressId,
        update: ProgressUpdate,
    ) -> Result<VideoProgressModel, StoreError> {
        let progress = VideoProgress::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::Missing("video progress"))?;

        let now = Utc::now();
        let mut progress: VideoProgressActiveModel = progress.into();
        progress.last_position = Set(update.last_position);
        progress.watch_percentage = Set(update.watch_percentage);
        progress.completed = Set(update.completed);
        progress.last_watched_at = Set(now);
        progress.updated_at = Set(now);

        Ok(progress.update(&self.db).await?)
    }
}

#[async_trait]
impl CommentRepository for DatabaseStore {
    async fn list_comments(&self, video_id: VideoId) -> Result<Vec<CommentWithAuthor>, StoreError> {
        let rows = VideoComment::find()
            .filter(VideoCommentColumn::VideoId.eq(video_id))
            .order_by_asc(VideoCommentColumn::CreatedAt) // Oldest first (conversation order)
            .order_by_asc(VideoCommentColumn::Id)
            .find_also_related(Profile)
            .all(&self.db)
            .await?;

        let comments = rows
            .into_iter()
            .map(|(comment, author)| CommentWithAuthor {
                comment,
                author: author.map(Into::into),
            })
            .collect();

        Ok(comments)
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<VideoCommentModel>, StoreError> {
        Ok(VideoComment::find_by_id(id).one(&self.db).await?)
    }

    async fn insert_comment(
        &self,
        video_id: VideoId,
        user_id: UserId,
        parent_id: Option<CommentId>,
        content: String,
    ) -> Result<VideoCommentModel, StoreError> {
        let now = Utc::now();
        let comment = VideoCommentActiveModel {
            id: Set(CommentId::new()),
            video_id: Set(video_id),
            user_id: Set(user_id),
            parent_id: Set(parent_id),
            content: Set(content),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(comment.insert(&self.db).await?)
    }

    async fn update_comment(
        &self,
        id: CommentId,
        content: String,
    ) -> Result<Option<VideoCommentModel>, StoreError> {
        let Some(comment) = VideoComment::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut comment: VideoCommentActiveModel = comment.into();
        comment.content = Set(content);
        comment.updated_at = Set(Utc::now());

        Ok(Some(comment.update(&self.db).await?))
    }

    async fn delete_comment(&self, id: CommentId) -> Result<bool, StoreError> {
        let result = VideoComment::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl ProfileRepository for DatabaseStore {
    async fn find_profile(&self, id: UserId) -> Result<Option<ProfileModel>, StoreError> {
        Ok(Profile::find_by_id(id).one(&self.db).await?)
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<ProfileModel, StoreError> {
        let now = Utc::now();
        let profile = ProfileActiveModel {
            id: Set(profile.id),
            email: Set(profile.email),
            full_name: Set(profile.full_name),
            avatar_url: Set(profile.avatar_url),
            role: Set(Role::default()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(profile.insert(&self.db).await?)
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<ProfileModel>, StoreError> {
        let Some(profile) = Profile::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut profile: ProfileActiveModel = profile.into();
        if let Some(full_name) = changes.full_name {
            profile.full_name = Set(Some(full_name));
        }
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = Set(Some(avatar_url));
        }
        profile.updated_at = Set(Utc::now());

        Ok(Some(profile.update(&self.db).await?))
    }

    async fn update_role(
        &self,
        id: UserId,
        role: Role,
    ) -> Result<Option<ProfileModel>, StoreError> {
        let Some(profile) = Profile::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut profile: ProfileActiveModel = profile.into();
        profile.role = Set(role);
        profile.updated_at = Set(Utc::now());

        Ok(Some(profile.update(&self.db).await?))
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<ProfileModel>, StoreError> {
        let mut query = Profile::find()
            .order_by_desc(ProfileColumn::CreatedAt)
            .order_by_desc(ProfileColumn::Id);
        if let Some(role) = role {
            query = query.filter(ProfileColumn::Role.eq(role));
        }

        Ok(query.all(&self.db).await?)
    }
}
