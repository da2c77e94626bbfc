use std::{collections::HashSet, sync::Arc};

use thiserror::Error;

use crate::{
    aggregate::{self, CourseProgress},
    entity::prelude::*,
    error::StoreError,
    identity::IdentityProvider,
    ids::{CourseId, SectionId, UserId, VideoId},
    store::{CourseFilter, CourseRepository, ProgressRepository, ProgressUpdate},
    video::normalize_watch_percentage,
};

#[derive(Debug, Error)]
pub enum ProgressServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("not signed in")]
    Unauthenticated,

    #[error("course not found")]
    CourseNotFound,
}

#[derive(Clone)]
pub struct ProgressService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl ProgressService {
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

    /// The viewer's progress on a video, `None` when signed out or never watched.
    pub async fn get_video_progress(
        &self,
        video_id: VideoId,
    ) -> Result<Option<VideoProgressModel>, ProgressServiceError> {
        let Some(user_id) = self.identity.current_user_id().await else {
            return Ok(None);
        };

        Ok(self.progress.find_progress(user_id, video_id).await?)
    }

    /// Upserts the viewer's progress row.
    ///
    /// The percentage is normalized to `0..=100` and a row that is already
    /// completed stays completed.
    pub async fn update_progress(
        &self,
        video_id: VideoId,
        last_position: i32,
        watch_percentage: f64,
        completed: bool,
    ) -> Result<VideoProgressModel, ProgressServiceError> {
        let user_id = self
            .identity
            .current_user_id()
            .await
            .ok_or(ProgressServiceError::Unauthenticated)?;

        let mut update = ProgressUpdate {
            last_position: last_position.max(0),
            watch_percentage: normalize_watch_percentage(watch_percentage),
            completed,
        };

        let saved = match self.progress.find_progress(user_id, video_id).await? {
            Some(existing) => {
                update.completed |= existing.completed;
                self.progress.update_progress(existing.id, update).await?
            }
            None => self.progress.insert_progress(user_id, video_id, update).await?,
        };

        tracing::debug!(
            %video_id,
            watch_percentage = saved.watch_percentage,
            completed = saved.completed,
            "saved video progress"
        );

        Ok(saved)
    }

    pub async fn mark_complete(
        &self,
        video_id: VideoId,
    ) -> Result<VideoProgressModel, ProgressServiceError> {
        self.update_progress(video_id, 0, 100.0, true).await
    }

    /// Completion roll-up of one course for the viewer. Signed-out viewers
    /// get the video count with zero progress.
    pub async fn course_progress(
        &self,
        course_id: CourseId,
    ) -> Result<CourseProgress, ProgressServiceError> {
        let course = self
            .courses
            .find_course(course_id)
            .await?
            .ok_or(ProgressServiceError::CourseNotFound)?;

        let user_id = self.identity.current_user_id().await;
        self.summarize(course, user_id).await
    }

    /// Courses matching `filter`, each with the viewer's completion.
    pub async fn courses_with_progress(
        &self,
        filter: &CourseFilter,
    ) -> Result<Vec<CourseProgress>, ProgressServiceError> {
        let user_id = self.identity.current_user_id().await;
        let courses = self.courses.list_courses(filter).await?;

        let mut summaries = Vec::with_capacity(courses.len());
        for course in courses {
            summaries.push(self.summarize(course, user_id).await?);
        }

        Ok(summaries)
    }

    /// Started but unfinished courses, most recently watched first.
    pub async fn continue_watching(&self) -> Result<Vec<CourseProgress>, ProgressServiceError> {
        let Some(user_id) = self.identity.current_user_id().await else {
            return Ok(Vec::new());
        };

        let rows = self.progress.list_progress_for_user(user_id).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let video_ids: Vec<VideoId> = rows.iter().map(|row| row.video_id).collect();
        let videos = self.courses.find_videos(&video_ids).await?;

        let section_ids: Vec<SectionId> = unique(videos.iter().map(|video| video.section_id));
        let sections = self.courses.find_sections(&section_ids).await?;

        let course_ids: Vec<CourseId> = unique(sections.iter().map(|section| section.course_id));

        let mut summaries = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            // Deleted between the two reads
            let Some(course) = self.courses.find_course(course_id).await? else {
                continue;
            };
            summaries.push(self.summarize(course, Some(user_id)).await?);
        }

        Ok(aggregate::continue_watching(summaries))
    }

    async fn summarize(
        &self,
        course: CourseModel,
        user_id: Option<UserId>,
    ) -> Result<CourseProgress, ProgressServiceError> {
        let section_ids: Vec<SectionId> = self
            .courses
            .list_sections(course.id)
            .await?
            .into_iter()
            .map(|section| section.id)
            .collect();
        let videos = self.courses.list_videos(&section_ids).await?;

        let Some(user_id) = user_id else {
            return Ok(CourseProgress::untracked(course, videos.len() as u64));
        };

        let video_ids: Vec<VideoId> = videos.iter().map(|video| video.id).collect();
        let rows = self
            .progress
            .list_progress_for_videos(user_id, &video_ids)
            .await?;

        Ok(CourseProgress::compute(course, &videos, &rows))
    }
}

/// First occurrence order.
fn unique<T: Copy + Eq + std::hash::Hash>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn signed_out_viewer_has_no_progress() {
        let store = setup_store().await;
        let owner = seed_profile(&store, "owner@example.com", Role::Admin).await;
        let (course, videos) = seed_course_with_videos(&store, owner.id, "Rust", 2).await;

        let service = ProgressService::new(store.clone(), store.clone(), anonymous());

        assert!(service.get_video_progress(videos[0].id).await.unwrap().is_none());
        assert!(matches!(
            service.update_progress(videos[0].id, 10, 10.0, false).await,
            Err(ProgressServiceError::Unauthenticated)
        ));

        let summary = service.course_progress(course.id).await.unwrap();
        assert_eq!(summary.total_videos, 2);
        assert_eq!(summary.progress_percentage, 0);
        assert!(service.continue_watching().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_and_normalizes() {
        let store = setup_store().await;
        let viewer = seed_profile(&store, "viewer@example.com", Role::Student).await;
        let (_, videos) = seed_course_with_videos(&store, viewer.id, "Rust", 1).await;

        let service = ProgressService::new(store.clone(), store.clone(), identity_for(viewer.id));

        let first = service.update_progress(videos[0].id, 30, 41.6, false).await.unwrap();
        assert_eq!(first.watch_percentage, 42);

        let second = service.update_progress(videos[0].id, -4, 150.0, false).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.watch_percentage, 100);
        assert_eq!(second.last_position, 0);

        let rows = store.list_progress_for_user(viewer.id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn completed_never_reverts() {
        let store = setup_store().await;
        let viewer = seed_profile(&store, "viewer@example.com", Role::Student).await;
        let (_, videos) = seed_course_with_videos(&store, viewer.id, "Rust", 1).await;

        let service = ProgressService::new(store.clone(), store.clone(), identity_for(viewer.id));

        let done = service.mark_complete(videos[0].id).await.unwrap();
        assert!(done.completed);
        assert_eq!(done.watch_percentage, 100);
        assert_eq!(done.last_position, 0);

        let rewatch = service.update_progress(videos[0].id, 20, 10.0, false).await.unwrap();
        assert!(rewatch.completed);
        assert_eq!(rewatch.watch_percentage, 10);
    }

    #[tokio::test]
    async fn course_progress_rolls_up_completed_videos() {
        let store = setup_store().await;
        let viewer = seed_profile(&store, "viewer@example.com", Role::Student).await;
        let (course, videos) = seed_course_with_videos(&store, viewer.id, "Rust", 4).await;

        let service = ProgressService::new(store.clone(), store.clone(), identity_for(viewer.id));
        service.mark_complete(videos[0].id).await.unwrap();
        service.mark_complete(videos[1].id).await.unwrap();
        service.update_progress(videos[2].id, 60, 20.0, false).await.unwrap();

        let summary = service.course_progress(course.id).await.unwrap();
        assert_eq!(summary.total_videos, 4);
        assert_eq!(summary.completed_videos, 2);
        assert_eq!(summary.progress_percentage, 50);
        assert!(summary.last_watched_at.is_some());

        assert!(matches!(
            service.course_progress(CourseId::new()).await,
            Err(ProgressServiceError::CourseNotFound)
        ));
    }

    #[tokio::test]
    async fn continue_watching_lists_partial_courses() {
        let store = setup_store().await;
        let viewer = seed_profile(&store, "viewer@example.com", Role::Student).await;
        let (partial, partial_videos) =
            seed_course_with_videos(&store, viewer.id, "Partial", 2).await;
        let (_, finished_videos) = seed_course_with_videos(&store, viewer.id, "Finished", 1).await;
        let (_, started_videos) = seed_course_with_videos(&store, viewer.id, "Started", 2).await;

        let service = ProgressService::new(store.clone(), store.clone(), identity_for(viewer.id));
        service.mark_complete(partial_videos[0].id).await.unwrap();
        service.update_progress(partial_videos[1].id, 5, 5.0, false).await.unwrap();
        service.mark_complete(finished_videos[0].id).await.unwrap();
        // Watched but nothing completed yet, so 0%
        service.update_progress(started_videos[0].id, 5, 5.0, false).await.unwrap();

        let picked = service.continue_watching().await.unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].course.id, partial.id);
        assert_eq!(picked[0].progress_percentage, 50);
    }
}
