use sea_orm::DbErr;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load config")]
    Config(#[from] ConfigError),
    #[error("data store unavailable")]
    Database(#[from] DbErr),
    #[error("media root unavailable")]
    Media(#[from] std::io::Error),
}
