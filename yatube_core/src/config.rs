use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "yatube";
static YATUBE_DB_NAME: &str = "yatube_db.sqlite";
static MEDIA_DIR_NAME: &str = "media";
static CONFIG_FILE_NAME: &str = "config.json";

// For now this directory structure should be like
// data_dir_path
// |- yatube
//    |- yatube_db.sqlite
//    |- media/
//    |- config.json

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no data directory available on this platform")]
    NoDataDir,
    #[error("config io error")]
    Io(#[from] std::io::Error),
    #[error("malformed config file")]
    Malformed(#[from] serde_json::Error),
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_login_url() -> String {
    "/auth/login/".to_string()
}

fn default_feed_cache_ttl_secs() -> u64 {
    20
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct YatubeConfig {
    pub database_path: PathBuf,
    /// Root directory for uploaded post images.
    pub media_root: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Where unauthenticated users are sent; `?next=` is appended.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_feed_cache_ttl_secs")]
    pub feed_cache_ttl_secs: u64,
    #[serde(default)]
    pub secure_cookies: bool,
}

impl YatubeConfig {
    /// Creates a new YatubeConfig with defaults rooted at the specified data directory
    pub fn new(data_dir: &Path) -> Self {
        YatubeConfig {
            database_path: data_dir.join(YATUBE_DB_NAME),
            media_root: data_dir.join(MEDIA_DIR_NAME),
            bind_addr: default_bind_addr(),
            login_url: default_login_url(),
            feed_cache_ttl_secs: default_feed_cache_ttl_secs(),
            secure_cookies: false,
        }
    }
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<YatubeConfig, ConfigError> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    get_or_init_in(&data_dir.join(DATA_DIR_NAME)).await
}

pub async fn get_or_init_in(yatube_dir: &Path) -> Result<YatubeConfig, ConfigError> {
    let config_path = yatube_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(yatube_dir).await?;

    if fs::try_exists(&config_path).await? {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let config: YatubeConfig = serde_json::from_str(&contents)?;
        Ok(config)
    } else {
        let config = YatubeConfig::new(yatube_dir);

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        Ok(config)
    }
}
