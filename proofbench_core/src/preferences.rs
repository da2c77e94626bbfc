use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};

use crate::{config::ConfigError, ids::UserId};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UserPreferences {
    /// Whether an admin last chose the admin view.
    pub admin_mode: bool,
}

/// Per-user preferences kept in one JSON file, keyed by user id.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<UserId, UserPreferences>>,
}

impl PreferenceStore {
    /// Reads `path`, starting empty if it does not exist yet.
    pub async fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let entries = if fs::try_exists(&path).await? {
            let contents = fs::read_to_string(&path).await?;
            serde_json::from_str(&contents)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub async fn get(&self, user_id: UserId) -> UserPreferences {
        self.entries
            .lock()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn set_admin_mode(&self, user_id: UserId, enabled: bool) -> Result<(), ConfigError> {
        let mut entries = self.entries.lock().await;
        entries.entry(user_id).or_default().admin_mode = enabled;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&*entries)?;
        fs::write(&self.path, json).await?;

        Ok(())
    }
}
