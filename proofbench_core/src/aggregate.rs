//! Per-course completion roll-up and "continue watching" selection.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    entity::prelude::{CourseModel, VideoModel, VideoProgressModel},
    ids::VideoId,
    video::progress_percentage,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    #[serde(flatten)]
    pub course: CourseModel,
    pub total_videos: u64,
    pub completed_videos: u64,
    pub progress_percentage: i32,
    pub last_watched_at: Option<DateTime<Utc>>,
}

impl CourseProgress {
    /// A course nobody is tracking progress for, e.g. an anonymous viewer.
    pub fn untracked(course: CourseModel, total_videos: u64) -> Self {
        Self {
            course,
            total_videos,
            completed_videos: 0,
            progress_percentage: 0,
            last_watched_at: None,
        }
    }

    /// Rolls up `progress` rows of a single viewer over the course's `videos`.
    /// Rows for videos outside the course are ignored.
    pub fn compute(
        course: CourseModel,
        videos: &[VideoModel],
        progress: &[VideoProgressModel],
    ) -> Self {
        let video_ids: HashSet<VideoId> = videos.iter().map(|video| video.id).collect();
        let relevant = progress
            .iter()
            .filter(|row| video_ids.contains(&row.video_id));

        let mut completed_videos = 0;
        let mut last_watched_at = None;
        for row in relevant {
            if row.completed {
                completed_videos += 1;
            }
            last_watched_at = last_watched_at.max(Some(row.last_watched_at));
        }

        let total_videos = video_ids.len() as u64;

        Self {
            course,
            total_videos,
            completed_videos,
            progress_percentage: progress_percentage(completed_videos, total_videos),
            last_watched_at,
        }
    }

    /// Started but not finished.
    pub fn is_in_progress(&self) -> bool {
        self.progress_percentage > 0 && self.progress_percentage < 100
    }
}

/// Keeps partially completed courses, most recently watched first. Courses
/// never watched sort last.
pub fn continue_watching(courses: Vec<CourseProgress>) -> Vec<CourseProgress> {
    let mut courses: Vec<_> = courses
        .into_iter()
        .filter(CourseProgress::is_in_progress)
        .collect();

    // `None < Some`, so comparing b to a puts missing timestamps at the end
    courses.sort_by(|a, b| b.last_watched_at.cmp(&a.last_watched_at));
    courses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::{CourseCategory, Tags},
        ids::{CourseId, ProgressId, SectionId, UserId},
    };
    use chrono::Duration;

    fn course(title: &str) -> CourseModel {
        let now = Utc::now();
        CourseModel {
            id: CourseId::new(),
            title: title.to_owned(),
            description: None,
            category: CourseCategory::Programming,
            thumbnail_url: None,
            tags: Tags::default(),
            published: true,
            created_by: UserId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn videos(count: usize) -> Vec<VideoModel> {
        let section_id = SectionId::new();
        let now = Utc::now();
        (0..count)
            .map(|index| VideoModel {
                id: VideoId::new(),
                section_id,
                title: format!("Video {index}"),
                description: None,
                video_url: "https://youtu.be/abc".to_owned(),
                duration: Some(600),
                order_index: index as i32,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    fn progress(video: &VideoModel, completed: bool, watched: DateTime<Utc>) -> VideoProgressModel {
        VideoProgressModel {
            id: ProgressId::new(),
            user_id: UserId::new(),
            video_id: video.id,
            last_position: 0,
            watch_percentage: if completed { 100 } else { 30 },
            completed,
            last_watched_at: watched,
            created_at: watched,
            updated_at: watched,
        }
    }

    fn with_percentage(title: &str, pct: i32, watched: Option<DateTime<Utc>>) -> CourseProgress {
        CourseProgress {
            progress_percentage: pct,
            last_watched_at: watched,
            ..CourseProgress::untracked(course(title), 4)
        }
    }

    #[test]
    fn empty_course_is_zero_percent() {
        let summary = CourseProgress::compute(course("Empty"), &[], &[]);
        assert_eq!(summary.total_videos, 0);
        assert_eq!(summary.progress_percentage, 0);
        assert_eq!(summary.last_watched_at, None);
    }

    #[test]
    fn half_completed_course() {
        let videos = videos(4);
        let now = Utc::now();
        let rows = vec![
            progress(&videos[0], true, now - Duration::hours(2)),
            progress(&videos[1], true, now - Duration::hours(1)),
            progress(&videos[2], false, now),
        ];

        let summary = CourseProgress::compute(course("Rust"), &videos, &rows);
        assert_eq!(summary.total_videos, 4);
        assert_eq!(summary.completed_videos, 2);
        assert_eq!(summary.progress_percentage, 50);
        assert_eq!(summary.last_watched_at, Some(now));
        assert!(summary.is_in_progress());
    }

    #[test]
    fn ignores_progress_for_other_courses() {
        let ours = videos(2);
        let theirs = videos(1);
        let rows = vec![progress(&theirs[0], true, Utc::now())];

        let summary = CourseProgress::compute(course("Ours"), &ours, &rows);
        assert_eq!(summary.completed_videos, 0);
        assert_eq!(summary.last_watched_at, None);
    }

    #[test]
    fn continue_watching_keeps_partial_courses_newest_first() {
        let now = Utc::now();
        let untouched = with_percentage("untouched", 0, Some(now));
        let finished = with_percentage("finished", 100, Some(now));
        let older = with_percentage("older", 50, Some(now - Duration::days(1)));
        let newer = with_percentage("newer", 25, Some(now));
        let unknown = with_percentage("unknown", 75, None);

        let picked = continue_watching(vec![untouched, unknown, older, finished, newer]);
        let titles: Vec<_> = picked.iter().map(|c| c.course.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older", "unknown"]);
    }
}
