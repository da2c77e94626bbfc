use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ids::UserId;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("sign out failed: {0}")]
    SignOut(String),
}

/// Source of the authenticated user. Attributing rows to a user always goes
/// through here.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user_id(&self) -> Option<UserId>;
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// In-process identity holder, for embedding hosts that resolve sign-in themselves.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    user: RwLock<Option<UserId>>,
}

impl LocalIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            user: RwLock::new(Some(user_id)),
        }
    }

    pub async fn sign_in(&self, user_id: UserId) {
        *self.user.write().await = Some(user_id);
        tracing::info!(%user_id, "signed in");
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn current_user_id(&self) -> Option<UserId> {
        *self.user.read().await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(user_id) = self.user.write().await.take() {
            tracing::info!(%user_id, "signed out");
        }
        Ok(())
    }
}
