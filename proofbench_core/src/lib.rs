pub mod aggregate;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod ids;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod service;
pub mod session;
pub mod store;
pub mod thread;
pub mod tracker;
pub mod video;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use crate::{
    identity::IdentityProvider,
    ids::VideoId,
    preferences::PreferenceStore,
    service::{CommentsService, CoursesService, ProfilesService, ProgressService},
    session::{Session, SessionError},
    store::DatabaseStore,
    tracker::{PlayerAdapter, ProgressTracker, TrackerHandle},
};

/// Main runtime handle for ProofBench.
pub struct ProofBench {
    pub config: config::ProofBenchConfig,

    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<DatabaseStore>,
    pub preferences: Arc<PreferenceStore>,

    pub courses: CoursesService,
    pub progress: ProgressService,
    pub comments: CommentsService,
    pub profiles: ProfilesService,
}

impl ProofBench {
    /// Loads the config from the platform data directory and starts from it.
    pub async fn start(
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = config::get_or_init().await?;
        Self::start_with(config, identity).await
    }

    pub async fn start_with(
        config: config::ProofBenchConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        logging::init(&config.log_filter);
        tracing::info!(?config, "starting proofbench");

        // DB + migrations
        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        let store = Arc::new(DatabaseStore::new(db));
        let preferences = Arc::new(PreferenceStore::load(config.preferences_path.clone()).await?);

        let courses = CoursesService::new(store.clone(), store.clone(), identity.clone());
        let progress = ProgressService::new(store.clone(), store.clone(), identity.clone());
        let comments = CommentsService::new(
            store.clone(),
            identity.clone(),
            config.comments.max_reply_depth,
        );
        let profiles = ProfilesService::new(store.clone(), identity.clone());

        Ok(Self {
            config,
            identity,
            store,
            preferences,
            courses,
            progress,
            comments,
            profiles,
        })
    }

    /// Session for whoever the identity provider reports as signed in.
    pub async fn session(&self) -> Result<Session, SessionError> {
        Session::load(
            self.identity.clone(),
            &self.profiles,
            self.preferences.clone(),
            &self.config.profile_fetch,
        )
        .await
    }

    /// Starts tracking the viewer's progress on `video_id` with the configured cadence.
    pub async fn watch(
        &self,
        video_id: VideoId,
        player: Arc<dyn PlayerAdapter>,
    ) -> Result<TrackerHandle, service::ProgressServiceError> {
        let tracker = ProgressTracker::open(self.progress.clone(), video_id, &self.config.tracker).await?;
        Ok(tracker.spawn(player, self.config.tracker.save_interval()))
    }

    pub async fn shutdown(self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.connection().clone().close().await?;
        tracing::info!("proofbench stopped");
        Ok(())
    }
}

pub mod prelude {
    pub use super::ids;
    pub use super::entity;
    pub use super::models;

    pub use super::service;
    pub use super::store;

    pub use super::error;

    pub use super::config;

    pub use super::tracker::{PlayerAdapter, SimulatedPlayer, TrackerHandle, TrackerSnapshot};
    pub use super::ProofBench;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::prelude::*,
        identity::LocalIdentity,
        store::NewProfile,
        tracker::SimulatedPlayer,
    };

    #[tokio::test]
    async fn starts_in_fresh_data_dir_and_tracks() {
        let dir = std::env::temp_dir().join(format!("proofbench-start-{}", uuid::Uuid::now_v7()));
        let config = config::load_or_init(dir.clone()).await.unwrap();

        let identity = Arc::new(LocalIdentity::new());
        let app = ProofBench::start_with(config, identity.clone()).await.unwrap();

        let user_id = ids::UserId::new();
        identity.sign_in(user_id).await;
        app.profiles
            .ensure_profile(NewProfile {
                id: user_id,
                email: "first@example.com".to_owned(),
                full_name: None,
                avatar_url: None,
            })
            .await
            .unwrap();

        let session = app.session().await.unwrap();
        assert_eq!(session.role(), Some(Role::Student));

        let (_, videos) =
            crate::test_utils::seed_course_with_videos(&app.store, user_id, "Start", 1).await;
        let player = Arc::new(SimulatedPlayer::new(Some(100), 0));
        player.seek(40);

        let handle = app.watch(videos[0].id, player).await.unwrap();
        handle.stop().await.unwrap();

        let progress = app.progress.get_video_progress(videos[0].id).await.unwrap().unwrap();
        assert_eq!(progress.watch_percentage, 40);

        app.shutdown().await.unwrap();
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
