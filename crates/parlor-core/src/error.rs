use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("prompt error: {0}")]
    Prompt(#[from] parlor_pm::PmError),

    #[error("snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("already initialized: {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
