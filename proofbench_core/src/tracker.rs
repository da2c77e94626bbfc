//! Watch progress tracking for the video currently on screen.
//!
//! A [`ProgressTracker`] owns the viewer's recorded state for one video and
//! decides when a playback sample is worth persisting. [`ProgressTracker::spawn`]
//! moves it onto a timer task that samples a [`PlayerAdapter`] every save
//! interval and makes one last save when the viewer leaves.

use std::{
    sync::{
        atomic::{AtomicI32, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    config::TrackerConfig,
    ids::VideoId,
    service::progress::{ProgressService, ProgressServiceError},
    video::{normalize_watch_percentage, should_mark_complete},
};

/// Viewers at or above this percentage may mark a video complete by hand.
const MANUAL_COMPLETION_PERCENTAGE: i32 = 80;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker task failed")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    /// No progress row yet.
    Untouched,
    InProgress,
    /// Terminal.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSample {
    /// Seconds into the video.
    pub position: i32,
    /// Total length in seconds, if the player knows it.
    pub duration: Option<i32>,
}

/// Source of playback position.
#[async_trait]
pub trait PlayerAdapter: Send + Sync {
    /// `None` while nothing is loaded.
    async fn sample(&self) -> Option<PlaybackSample>;
}

/// Stand-in player whose position advances by `step` seconds per sample.
#[derive(Debug)]
pub struct SimulatedPlayer {
    position: AtomicI32,
    step: i32,
    duration: Option<i32>,
}

impl SimulatedPlayer {
    pub fn new(duration: Option<i32>, step: i32) -> Self {
        Self {
            position: AtomicI32::new(0),
            step,
            duration,
        }
    }

    pub fn seek(&self, position: i32) {
        self.position.store(position.max(0), Ordering::SeqCst);
    }

    pub fn position(&self) -> i32 {
        self.position.load(Ordering::SeqCst)
    }

    fn advance(&self, position: i32) -> i32 {
        let next = position.saturating_add(self.step);
        match self.duration {
            Some(duration) => next.min(duration.max(0)),
            None => next,
        }
    }
}

#[async_trait]
impl PlayerAdapter for SimulatedPlayer {
    async fn sample(&self) -> Option<PlaybackSample> {
        let previous = self
            .position
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |position| {
                Some(self.advance(position))
            })
            .unwrap_or_else(|current| current);

        Some(PlaybackSample {
            position: self.advance(previous),
            duration: self.duration,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub state: WatchState,
    pub watch_percentage: i32,
    pub last_position: i32,
}

impl TrackerSnapshot {
    pub fn offers_manual_completion(&self) -> bool {
        self.state != WatchState::Completed
            && self.watch_percentage > MANUAL_COMPLETION_PERCENTAGE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Not ahead of what is already recorded.
    Skipped,
    Saved,
    /// Saved and crossed into [`WatchState::Completed`].
    Completed,
}

pub struct ProgressTracker {
    service: ProgressService,
    video_id: VideoId,
    completion_threshold: i32,
    state: WatchState,
    watch_percentage: i32,
    last_position: i32,
}

impl ProgressTracker {
    /// Tracker starting from nothing recorded.
    pub fn new(service: ProgressService, video_id: VideoId, completion_threshold: i32) -> Self {
        Self {
            service,
            video_id,
            completion_threshold,
            state: WatchState::Untouched,
            watch_percentage: 0,
            last_position: 0,
        }
    }

    /// Tracker resuming from the viewer's stored progress.
    pub async fn open(
        service: ProgressService,
        video_id: VideoId,
        config: &TrackerConfig,
    ) -> Result<Self, ProgressServiceError> {
        let existing = service.get_video_progress(video_id).await?;
        let mut tracker = Self::new(service, video_id, config.completion_threshold);

        if let Some(progress) = existing {
            tracker.watch_percentage = progress.watch_percentage;
            tracker.last_position = progress.last_position;
            tracker.state = if progress.completed {
                WatchState::Completed
            } else {
                WatchState::InProgress
            };
        }

        tracing::debug!(
            video_id = %tracker.video_id,
            state = ?tracker.state,
            watch_percentage = tracker.watch_percentage,
            "opened progress tracker"
        );

        Ok(tracker)
    }

    pub fn video_id(&self) -> VideoId {
        self.video_id
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            state: self.state,
            watch_percentage: self.watch_percentage,
            last_position: self.last_position,
        }
    }

    /// Recorded percentage when the duration is unknown, so such samples never save.
    pub fn percentage_for(&self, sample: PlaybackSample) -> i32 {
        match sample.duration {
            Some(duration) if duration > 0 => {
                normalize_watch_percentage(f64::from(sample.position) * 100.0 / f64::from(duration))
            }
            _ => self.watch_percentage,
        }
    }

    /// Persists `watch_percentage` if it is ahead of the recorded value.
    pub async fn save(
        &mut self,
        position: i32,
        watch_percentage: i32,
    ) -> Result<SaveOutcome, ProgressServiceError> {
        let watch_percentage = watch_percentage.clamp(0, 100);
        if watch_percentage <= self.watch_percentage {
            return Ok(SaveOutcome::Skipped);
        }

        let completed = should_mark_complete(watch_percentage, self.completion_threshold);
        let saved = self
            .service
            .update_progress(
                self.video_id,
                position,
                f64::from(watch_percentage),
                completed,
            )
            .await?;

        self.watch_percentage = saved.watch_percentage;
        self.last_position = saved.last_position;

        if saved.completed && self.state != WatchState::Completed {
            self.state = WatchState::Completed;
            tracing::info!(video_id = %self.video_id, "video completed");
            return Ok(SaveOutcome::Completed);
        }
        if self.state == WatchState::Untouched {
            self.state = WatchState::InProgress;
        }

        Ok(SaveOutcome::Saved)
    }

    /// Samples `player` and saves. A failed save is logged and dropped.
    pub async fn tick(&mut self, player: &dyn PlayerAdapter) -> SaveOutcome {
        let Some(sample) = player.sample().await else {
            return SaveOutcome::Skipped;
        };

        let watch_percentage = self.percentage_for(sample);
        match self.save(sample.position, watch_percentage).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!(video_id = %self.video_id, %error, "failed to save progress");
                SaveOutcome::Skipped
            }
        }
    }

    pub async fn mark_complete(&mut self) -> Result<(), ProgressServiceError> {
        let saved = self.service.mark_complete(self.video_id).await?;

        self.state = WatchState::Completed;
        self.watch_percentage = saved.watch_percentage;
        self.last_position = saved.last_position;

        tracing::info!(video_id = %self.video_id, "video marked complete");
        Ok(())
    }

    /// Moves the tracker onto a task that ticks every `interval`.
    ///
    /// The task runs until [`TrackerHandle::stop`] is called or the handle is
    /// dropped, and saves once more before it exits.
    pub fn spawn(self, player: Arc<dyn PlayerAdapter>, interval: Duration) -> TrackerHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let (snapshot_tx, snapshot_rx) = watch::channel(self.snapshot());

        let task = tokio::spawn(async move {
            let mut tracker = self;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        tracker.tick(player.as_ref()).await;
                        snapshot_tx.send_replace(tracker.snapshot());
                    }
                }
            }

            tracker.tick(player.as_ref()).await;
            snapshot_tx.send_replace(tracker.snapshot());

            tracing::debug!(video_id = %tracker.video_id, "progress tracker stopped");
            tracker
        });

        TrackerHandle {
            stop: Some(stop_tx),
            snapshots: snapshot_rx,
            task,
        }
    }
}

/// Handle to a running tracker task.
pub struct TrackerHandle {
    stop: Option<oneshot::Sender<()>>,
    snapshots: watch::Receiver<TrackerSnapshot>,
    task: JoinHandle<ProgressTracker>,
}

impl TrackerHandle {
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        *self.snapshots.borrow()
    }

    /// Stops ticking, waits for the final save and hands the tracker back.
    pub async fn stop(mut self) -> Result<ProgressTracker, TrackerError> {
        if let Some(stop) = self.stop.take() {
            // The task may already be gone
            let _ = stop.send(());
        }

        Ok(self.task.await?)
    }
}
