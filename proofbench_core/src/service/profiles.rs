use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::RetryConfig,
    entity::prelude::*,
    error::StoreError,
    identity::IdentityProvider,
    ids::UserId,
    store::{NewProfile, ProfileChanges, ProfileRepository},
};

#[derive(Debug, Error)]
pub enum ProfilesServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("not signed in")]
    Unauthenticated,

    #[error("profile not found")]
    ProfileNotFound,

    #[error("cannot change your own role")]
    CannotChangeOwnRole,

    #[error("forbidden: only super admins may change roles")]
    Forbidden,
}

#[derive(Clone)]
pub struct ProfilesService {
    profiles: Arc<dyn ProfileRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl ProfilesService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { profiles, identity }
    }

    /// The signed-in user's profile, `None` when signed out.
    pub async fn current_profile(&self) -> Result<Option<ProfileModel>, ProfilesServiceError> {
        let Some(user_id) = self.identity.current_user_id().await else {
            return Ok(None);
        };

        Ok(self.profiles.find_profile(user_id).await?)
    }

    pub async fn get_profile(&self, user_id: UserId) -> Result<ProfileModel, ProfilesServiceError> {
        self.profiles
            .find_profile(user_id)
            .await?
            .ok_or(ProfilesServiceError::ProfileNotFound)
    }

    /// Finds the profile for `profile.id`, creating it as a student on first sign-in.
    pub async fn ensure_profile(
        &self,
        profile: NewProfile,
    ) -> Result<ProfileModel, ProfilesServiceError> {
        if let Some(existing) = self.profiles.find_profile(profile.id).await? {
            return Ok(existing);
        }

        let created = self.profiles.insert_profile(profile).await?;
        tracing::info!(user_id = %created.id, "profile created");

        Ok(created)
    }

    /// Updates the signed-in user's own display fields.
    pub async fn update_profile(
        &self,
        changes: ProfileChanges,
    ) -> Result<ProfileModel, ProfilesServiceError> {
        let user_id = self
            .identity
            .current_user_id()
            .await
            .ok_or(ProfilesServiceError::Unauthenticated)?;

        self.profiles
            .update_profile(user_id, changes)
            .await?
            .ok_or(ProfilesServiceError::ProfileNotFound)
    }

    /// Changes another user's role. Only super admins may do this.
    pub async fn update_role(
        &self,
        target: UserId,
        role: Role,
    ) -> Result<ProfileModel, ProfilesServiceError> {
        let actor = self.identity.current_user_id().await;

        // Checked before anything touches the store
        if actor == Some(target) {
            return Err(ProfilesServiceError::CannotChangeOwnRole);
        }
        let actor = actor.ok_or(ProfilesServiceError::Unauthenticated)?;

        let actor_role = self.get_profile(actor).await?.role;
        if !actor_role.is_super_admin() {
            tracing::warn!(%actor, %target, "role change refused");
            return Err(ProfilesServiceError::Forbidden);
        }

        let updated = self
            .profiles
            .update_role(target, role)
            .await?
            .ok_or(ProfilesServiceError::ProfileNotFound)?;

        tracing::info!(%actor, %target, role = role.label(), "role changed");
        Ok(updated)
    }

    /// Newest first.
    pub async fn list_users(&self) -> Result<Vec<ProfileModel>, ProfilesServiceError> {
        Ok(self.profiles.list_profiles(None).await?)
    }

    pub async fn list_users_by_role(
        &self,
        role: Role,
    ) -> Result<Vec<ProfileModel>, ProfilesServiceError> {
        Ok(self.profiles.list_profiles(Some(role)).await?)
    }

    /// Reads a profile that may not exist yet right after sign-in, backing off
    /// between attempts. `None` once the retries are used up.
    pub async fn fetch_profile_with_retry(
        &self,
        user_id: UserId,
        retry: &RetryConfig,
    ) -> Result<Option<ProfileModel>, ProfilesServiceError> {
        let mut attempt = 0;

        loop {
            if let Some(profile) = self.profiles.find_profile(user_id).await? {
                return Ok(Some(profile));
            }

            if attempt >= retry.max_retries {
                tracing::warn!(%user_id, attempts = attempt + 1, "profile still missing");
                return Ok(None);
            }

            let delay = retry.delay_for(attempt);
            tracing::info!(%user_id, ?delay, "profile not found yet, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use async_trait::async_trait;

    /// Fails the test if the service reaches the store at all.
    struct UntouchableStore;

    #[async_trait]
    impl ProfileRepository for UntouchableStore {
        async fn find_profile(&self, _: UserId) -> Result<Option<ProfileModel>, StoreError> {
            panic!("store was contacted")
        }

        async fn insert_profile(&self, _: NewProfile) -> Result<ProfileModel, StoreError> {
            panic!("store was contacted")
        }

        async fn update_profile(
            &self,
            _: UserId,
            _: ProfileChanges,
        ) -> Result<Option<ProfileModel>, StoreError> {
            panic!("store was contacted")
        }

        async fn update_role(&self, _: UserId, _: Role) -> Result<Option<ProfileModel>, StoreError> {
            panic!("store was contacted")
        }

        async fn list_profiles(&self, _: Option<Role>) -> Result<Vec<ProfileModel>, StoreError> {
            panic!("store was contacted")
        }
    }

    fn new_profile(email: &str) -> NewProfile {
        NewProfile {
            id: UserId::new(),
            email: email.to_owned(),
            full_name: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn own_role_change_never_reaches_store() {
        let me = UserId::new();
        let service = ProfilesService::new(Arc::new(UntouchableStore), identity_for(me));

        assert!(matches!(
            service.update_role(me, Role::Student).await,
            Err(ProfilesServiceError::CannotChangeOwnRole)
        ));
    }

    #[tokio::test]
    async fn only_super_admins_change_roles() {
        let store = setup_store().await;
        let student = seed_profile(&store, "student@example.com", Role::Student).await;
        let admin = seed_profile(&store, "admin@example.com", Role::Admin).await;
        let root = seed_profile(&store, "root@example.com", Role::SuperAdmin).await;

        let signed_out = ProfilesService::new(store.clone(), anonymous());
        assert!(matches!(
            signed_out.update_role(student.id, Role::Admin).await,
            Err(ProfilesServiceError::Unauthenticated)
        ));

        let as_admin = ProfilesService::new(store.clone(), identity_for(admin.id));
        assert!(matches!(
            as_admin.update_role(student.id, Role::Admin).await,
            Err(ProfilesServiceError::Forbidden)
        ));

        let as_root = ProfilesService::new(store.clone(), identity_for(root.id));
        let promoted = as_root.update_role(student.id, Role::Admin).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);

        assert!(matches!(
            as_root.update_role(UserId::new(), Role::Admin).await,
            Err(ProfilesServiceError::ProfileNotFound)
        ));

        let admins = as_root.list_users_by_role(Role::Admin).await.unwrap();
        assert_eq!(admins.len(), 2);
        assert_eq!(as_root.list_users().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn ensure_profile_creates_student_once() {
        let store = setup_store().await;
        let profile = new_profile("new@example.com");
        let service = ProfilesService::new(store.clone(), identity_for(profile.id));

        let created = service.ensure_profile(profile.clone()).await.unwrap();
        assert_eq!(created.role, Role::Student);

        let again = service.ensure_profile(profile).await.unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(service.list_users().await.unwrap().len(), 1);

        let current = service.current_profile().await.unwrap().unwrap();
        assert_eq!(current.email, "new@example.com");
    }

    #[tokio::test]
    async fn updates_own_display_fields() {
        let store = setup_store().await;
        let me = seed_profile(&store, "me@example.com", Role::Student).await;
        let service = ProfilesService::new(store.clone(), identity_for(me.id));

        let updated = service
            .update_profile(ProfileChanges {
                full_name: Some("Sam Doe".to_owned()),
                avatar_url: None,
            })
            .await
            .unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Sam Doe"));
        assert_eq!(updated.avatar_url, None);

        let signed_out = ProfilesService::new(store.clone(), anonymous());
        assert!(signed_out.current_profile().await.unwrap().is_none());
        assert!(matches!(
            signed_out.update_profile(ProfileChanges::default()).await,
            Err(ProfilesServiceError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_retries() {
        let store = setup_store().await;
        let service = ProfilesService::new(store.clone(), anonymous());
        let retry = RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };

        let missing = service.fetch_profile_with_retry(UserId::new(), &retry).await.unwrap();
        assert!(missing.is_none());

        let existing = seed_profile(&store, "late@example.com", Role::Student).await;
        let found = service.fetch_profile_with_retry(existing.id, &retry).await.unwrap();
        assert_eq!(found.map(|profile| profile.id), Some(existing.id));
    }
}
