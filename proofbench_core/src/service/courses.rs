use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::StoreError,
    identity::IdentityProvider,
    ids::{CourseId, ResourceId, SectionId, VideoId},
    store::{
        CourseChanges, CourseFilter, CourseRepository, NewCourse, NewResource, NewVideo,
        ProgressRepository, SectionChanges, VideoChanges,
    },
    video::{is_valid_video_url, total_duration},
};

#[derive(Debug, Error)]
pub enum CoursesServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("not signed in")]
    Unauthenticated,

    #[error("course not found")]
    CourseNotFound,

    #[error("section not found")]
    SectionNotFound,

    #[error("video not found")]
    VideoNotFound,

    #[error("resource not found")]
    ResourceNotFound,

    #[error("not a YouTube or Vimeo link: {0}")]
    InvalidVideoUrl(String),
}

/// A video with what the viewer needs next to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    #[serde(flatten)]
    pub video: VideoModel,
    /// The viewer's progress, if signed in and ever watched.
    pub progress: Option<VideoProgressModel>,
    pub resources: Vec<VideoResourceModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutline {
    #[serde(flatten)]
    pub section: SectionModel,
    pub videos: Vec<VideoEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
    #[serde(flatten)]
    pub course: CourseModel,
    pub sections: Vec<SectionOutline>,
}

impl CourseOutline {
    pub fn videos(&self) -> impl Iterator<Item = &VideoEntry> {
        self.sections.iter().flat_map(|section| section.videos.iter())
    }

    pub fn video_count(&self) -> usize {
        self.videos().count()
    }

    /// Seconds across all videos with a known duration.
    pub fn total_duration(&self) -> i64 {
        let durations: Vec<Option<i32>> = self.videos().map(|entry| entry.video.duration).collect();
        total_duration(&durations)
    }

    /// Where playback starts when the course is opened.
    pub fn first_video(&self) -> Option<&VideoEntry> {
        self.videos().next()
    }

    pub fn find_video(&self, video_id: VideoId) -> Option<&VideoEntry> {
        self.videos().find(|entry| entry.video.id == video_id)
    }
}

#[derive(Clone)]
pub struct CoursesService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl CoursesService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        progress: Arc<dyn ProgressRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            courses,
            progress,
            identity,
        }
    }

    /// Newest first.
    pub async fn list_courses(
        &self,
        filter: &CourseFilter,
    ) -> Result<Vec<CourseModel>, CoursesServiceError> {
        Ok(self.courses.list_courses(filter).await?)
    }

    pub async fn get_course(&self, course_id: CourseId) -> Result<CourseModel, CoursesServiceError> {
        self.courses
            .find_course(course_id)
            .await?
            .ok_or(CoursesServiceError::CourseNotFound)
    }

    /// The course with its ordered sections and videos, each video carrying
    /// its resources and the viewer's progress.
    pub async fn course_outline(
        &self,
        course_id: CourseId,
    ) -> Result<Option<CourseOutline>, CoursesServiceError> {
        let Some(course) = self.courses.find_course(course_id).await? else {
            return Ok(None);
        };

        let sections = self.courses.list_sections(course_id).await?;
        let section_ids: Vec<SectionId> = sections.iter().map(|section| section.id).collect();
        let videos = self.courses.list_videos(&section_ids).await?;
        let video_ids: Vec<VideoId> = videos.iter().map(|video| video.id).collect();

        let mut resources: HashMap<VideoId, Vec<VideoResourceModel>> = HashMap::new();
        for resource in self.courses.list_resources(&video_ids).await? {
            resources.entry(resource.video_id).or_default().push(resource);
        }

        let mut progress: HashMap<VideoId, VideoProgressModel> = HashMap::new();
        if let Some(user_id) = self.identity.current_user_id().await {
            for row in self
                .progress
                .list_progress_for_videos(user_id, &video_ids)
                .await?
            {
                progress.insert(row.video_id, row);
            }
        }

        let mut by_section: HashMap<SectionId, Vec<VideoEntry>> = HashMap::new();
        for video in videos {
            let entry = VideoEntry {
                progress: progress.remove(&video.id),
                resources: resources.remove(&video.id).unwrap_or_default(),
                video,
            };
            by_section.entry(entry.video.section_id).or_default().push(entry);
        }

        let sections = sections
            .into_iter()
            .map(|section| SectionOutline {
                videos: by_section.remove(&section.id).unwrap_or_default(),
                section,
            })
            .collect();

        Ok(Some(CourseOutline { course, sections }))
    }

    /// Creates a course owned by the current user.
    pub async fn create_course(
        &self,
        course: NewCourse,
    ) -> Result<CourseModel, CoursesServiceError> {
        let user_id = self
            .identity
            .current_user_id()
            .await
            .ok_or(CoursesServiceError::Unauthenticated)?;

        let course = self.courses.insert_course(user_id, course).await?;
        tracing::info!(course_id = %course.id, title = %course.title, "course created");

        Ok(course)
    }

    pub async fn update_course(
        &self,
        course_id: CourseId,
        changes: CourseChanges,
    ) -> Result<CourseModel, CoursesServiceError> {
        self.courses
            .update_course(course_id, changes)
            .await?
            .ok_or(CoursesServiceError::CourseNotFound)
    }

    pub async fn set_published(
        &self,
        course_id: CourseId,
        published: bool,
    ) -> Result<CourseModel, CoursesServiceError> {
        let changes = CourseChanges {
            published: Some(published),
            ..CourseChanges::default()
        };
        self.update_course(course_id, changes).await
    }

    /// Deletes the course and everything under it.
    pub async fn delete_course(&self, course_id: CourseId) -> Result<(), CoursesServiceError> {
        if !self.courses.delete_course(course_id).await? {
            return Err(CoursesServiceError::CourseNotFound);
        }

        tracing::info!(%course_id, "course deleted");
        Ok(())
    }

    /// Appends a section to the end of the course.
    pub async fn create_section(
        &self,
        course_id: CourseId,
        name: String,
    ) -> Result<SectionModel, CoursesServiceError> {
        self.get_course(course_id).await?;

        let order_index = self.courses.list_sections(course_id).await?.len() as i32;
        Ok(self
            .courses
            .insert_section(course_id, name, order_index)
            .await?)
    }

    pub async fn update_section(
        &self,
        section_id: SectionId,
        changes: SectionChanges,
    ) -> Result<SectionModel, CoursesServiceError> {
        self.courses
            .update_section(section_id, changes)
            .await?
            .ok_or(CoursesServiceError::SectionNotFound)
    }

    pub async fn delete_section(&self, section_id: SectionId) -> Result<(), CoursesServiceError> {
        if !self.courses.delete_section(section_id).await? {
            return Err(CoursesServiceError::SectionNotFound);
        }
        Ok(())
    }

    /// Renumbers the course's sections `0..n` in the given order. Sections
    /// left out of `ordered` keep their relative order after the listed ones;
    /// ids from other courses are ignored.
    pub async fn reorder_sections(
        &self,
        course_id: CourseId,
        ordered: &[SectionId],
    ) -> Result<(), CoursesServiceError> {
        self.get_course(course_id).await?;

        let current: Vec<SectionId> = self
            .courses
            .list_sections(course_id)
            .await?
            .into_iter()
            .map(|section| section.id)
            .collect();

        let ordering = complete_ordering(&current, ordered);
        self.courses.reorder_sections(course_id, &ordering).await?;

        tracing::debug!(%course_id, sections = ordering.len(), "sections reordered");
        Ok(())
    }

    /// Adds a video to a section, at the end unless `video.order_index` is set.
    pub async fn create_video(
        &self,
        section_id: SectionId,
        video: NewVideo,
    ) -> Result<VideoModel, CoursesServiceError> {
        if !is_valid_video_url(&video.video_url) {
            return Err(CoursesServiceError::InvalidVideoUrl(video.video_url));
        }

        self.courses
            .find_section(section_id)
            .await?
            .ok_or(CoursesServiceError::SectionNotFound)?;

        let order_index = match video.order_index {
            Some(order_index) => order_index,
            None => self.courses.list_videos(&[section_id]).await?.len() as i32,
        };

        Ok(self
            .courses
            .insert_video(section_id, video, order_index)
            .await?)
    }

    pub async fn update_video(
        &self,
        video_id: VideoId,
        changes: VideoChanges,
    ) -> Result<VideoModel, CoursesServiceError> {
        if let Some(url) = changes.video_url.as_deref() {
            if !is_valid_video_url(url) {
                return Err(CoursesServiceError::InvalidVideoUrl(url.to_owned()));
            }
        }

        self.courses
            .update_video(video_id, changes)
            .await?
            .ok_or(CoursesServiceError::VideoNotFound)
    }

    pub async fn delete_video(&self, video_id: VideoId) -> Result<(), CoursesServiceError> {
        if !self.courses.delete_video(video_id).await? {
            return Err(CoursesServiceError::VideoNotFound);
        }
        Ok(())
    }

    /// Renumbers the section's videos `0..n`, like [`Self::reorder_sections`].
    pub async fn reorder_videos(
        &self,
        section_id: SectionId,
        ordered: &[VideoId],
    ) -> Result<(), CoursesServiceError> {
        self.courses
            .find_section(section_id)
            .await?
            .ok_or(CoursesServiceError::SectionNotFound)?;

        let current: Vec<VideoId> = self
            .courses
            .list_videos(&[section_id])
            .await?
            .into_iter()
            .map(|video| video.id)
            .collect();

        let ordering = complete_ordering(&current, ordered);
        self.courses.reorder_videos(section_id, &ordering).await?;

        tracing::debug!(%section_id, videos = ordering.len(), "videos reordered");
        Ok(())
    }

    pub async fn create_resource(
        &self,
        video_id: VideoId,
        resource: NewResource,
    ) -> Result<VideoResourceModel, CoursesServiceError> {
        self.courses
            .find_video(video_id)
            .await?
            .ok_or(CoursesServiceError::VideoNotFound)?;

        Ok(self.courses.insert_resource(video_id, resource).await?)
    }

    pub async fn list_resources(
        &self,
        video_id: VideoId,
    ) -> Result<Vec<VideoResourceModel>, CoursesServiceError> {
        Ok(self.courses.list_resources(&[video_id]).await?)
    }

    pub async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), CoursesServiceError> {
        if !self.courses.delete_resource(resource_id).await? {
            return Err(CoursesServiceError::ResourceNotFound);
        }
        Ok(())
    }
}

/// `requested` ids that are in `current`, deduplicated, followed by the rest
/// of `current` in its existing order.
fn complete_ordering<T: Copy + Eq + std::hash::Hash>(current: &[T], requested: &[T]) -> Vec<T> {
    let known: HashSet<T> = current.iter().copied().collect();
    let mut placed = HashSet::with_capacity(current.len());

    let mut ordering: Vec<T> = requested
        .iter()
        .copied()
        .filter(|id| known.contains(id) && placed.insert(*id))
        .collect();
    ordering.extend(current.iter().copied().filter(|id| !placed.contains(id)));

    ordering
}
