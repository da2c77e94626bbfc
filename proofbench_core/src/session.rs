//! Who is signed in, what their role lets them do, and whether they are
//! looking at the admin view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::{ConfigError, RetryConfig},
    entity::prelude::*,
    identity::{IdentityError, IdentityProvider},
    ids::UserId,
    preferences::PreferenceStore,
    service::profiles::{ProfilesService, ProfilesServiceError},
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Profiles(#[from] ProfilesServiceError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("failed to persist preferences")]
    Preferences(#[from] ConfigError),
}

/// What the signed-in role allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub manage_courses: bool,
    pub manage_users: bool,
    /// May switch to the admin view.
    pub admin_mode: bool,
}

impl Capabilities {
    pub fn for_role(role: Option<Role>) -> Self {
        let Some(role) = role else {
            return Self::default();
        };

        Self {
            manage_courses: role.is_admin(),
            manage_users: role.is_super_admin(),
            admin_mode: role.is_admin(),
        }
    }
}

pub struct Session {
    identity: Arc<dyn IdentityProvider>,
    preferences: Arc<PreferenceStore>,
    profile: Option<ProfileModel>,
    admin_mode: bool,
}

impl Session {
    /// Resolves the current user's profile, retrying while it is still being
    /// created, and restores their admin mode choice.
    pub async fn load(
        identity: Arc<dyn IdentityProvider>,
        profiles: &ProfilesService,
        preferences: Arc<PreferenceStore>,
        retry: &RetryConfig,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            identity,
            preferences,
            profile: None,
            admin_mode: false,
        };
        session.refresh(profiles, retry).await?;

        Ok(session)
    }

    /// Reloads the profile, e.g. after sign-in.
    pub async fn refresh(
        &mut self,
        profiles: &ProfilesService,
        retry: &RetryConfig,
    ) -> Result<(), SessionError> {
        self.profile = match self.identity.current_user_id().await {
            Some(user_id) => profiles.fetch_profile_with_retry(user_id, retry).await?,
            None => None,
        };

        self.admin_mode = match &self.profile {
            Some(profile) => self.preferences.get(profile.id).await.admin_mode,
            None => false,
        };

        Ok(())
    }

    pub fn profile(&self) -> Option<&ProfileModel> {
        self.profile.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.profile.as_ref().map(|profile| profile.id)
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|profile| profile.role)
    }

    pub fn is_signed_in(&self) -> bool {
        self.profile.is_some()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.role())
    }

    /// Stored choice, only honoured while the role still allows it.
    pub fn admin_mode(&self) -> bool {
        self.admin_mode && self.capabilities().admin_mode
    }

    /// Flips admin mode and returns the new value. Refused without the capability.
    pub async fn toggle_admin_mode(&mut self) -> Result<bool, SessionError> {
        let enabled = !self.admin_mode();
        self.set_admin_mode(enabled).await
    }

    pub async fn set_admin_mode(&mut self, enabled: bool) -> Result<bool, SessionError> {
        let Some(user_id) = self.user_id() else {
            tracing::warn!("admin mode toggle without a signed-in user");
            return Ok(self.admin_mode());
        };

        if !self.capabilities().admin_mode {
            tracing::warn!(%user_id, "admin mode refused for role without access");
            return Ok(self.admin_mode());
        }

        self.preferences.set_admin_mode(user_id, enabled).await?;
        self.admin_mode = enabled;

        tracing::info!(%user_id, enabled, "admin mode changed");
        Ok(self.admin_mode())
    }

    pub async fn sign_out(&mut self) -> Result<(), SessionError> {
        self.identity.sign_out().await?;
        self.profile = None;
        self.admin_mode = false;
        Ok(())
    }
}
