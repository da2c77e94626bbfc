use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::{thread::DEFAULT_MAX_REPLY_DEPTH, video::DEFAULT_COMPLETION_THRESHOLD};

static DATA_DIR_NAME: &str = "proofbench";
static DB_NAME: &str = "proofbench.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";
static PREFERENCES_FILE_NAME: &str = "preferences.json";

// data_dir_path
// |- proofbench
//    |- proofbench.sqlite
//    |- config.json
//    |- preferences.json

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no data directory on this platform")]
    NoDataDir,
    #[error("config io error")]
    Io(#[from] std::io::Error),
    #[error("malformed config file")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Seconds between periodic progress saves.
    pub save_interval_secs: u64,
    pub completion_threshold: i32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            save_interval_secs: 10,
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
        }
    }
}

impl TrackerConfig {
    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs.max(1))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CommentsConfig {
    pub max_reply_depth: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            max_reply_depth: DEFAULT_MAX_REPLY_DEPTH,
        }
    }
}

/// Backoff for the first profile read after sign-in, when the row may not exist yet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 4000,
        }
    }
}

impl RetryConfig {
    /// `min(base * 2^attempt, max)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProofBenchConfig {
    pub database_path: PathBuf,

    /// Per-user preferences such as the admin mode toggle.
    pub preferences_path: PathBuf,

    /// `EnvFilter` directive used when neither `PROOFBENCH_LOG` nor `RUST_LOG` is set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub comments: CommentsConfig,

    #[serde(default)]
    pub profile_fetch: RetryConfig,
}

fn default_log_filter() -> String {
    "info,proofbench_core=info".to_owned()
}

impl ProofBenchConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        ProofBenchConfig {
            database_path: data_dir.join(DB_NAME),
            preferences_path: data_dir.join(PREFERENCES_FILE_NAME),
            log_filter: default_log_filter(),
            tracker: TrackerConfig::default(),
            comments: CommentsConfig::default(),
            profile_fetch: RetryConfig::default(),
        }
    }
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<ProofBenchConfig, ConfigError> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    load_or_init(data_dir.join(DATA_DIR_NAME)).await
}

/// Same as [`get_or_init`] for an explicit application directory.
pub async fn load_or_init(app_dir: PathBuf) -> Result<ProofBenchConfig, ConfigError> {
    let config_path = app_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(&app_dir).await?;

    if fs::try_exists(&config_path).await? {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        Ok(serde_json::from_str(&contents)?)
    } else {
        let config = ProofBenchConfig::new(app_dir);

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        Ok(config)
    }
}
