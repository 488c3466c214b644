use thiserror::Error;

use crate::{
    api::{live_feed::FeedError, storage::StorageError},
    config::ConfigError,
    focus::LayoutError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid control layout: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Failed to open log file: {0}")]
    Log(std::io::Error),
    #[error("Terminal failure: {0}")]
    Terminal(#[from] std::io::Error),
}
