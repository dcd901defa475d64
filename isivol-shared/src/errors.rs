//! Error types used across the Isivol plugin.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for Isivol operations.
pub type IsivolResult<T> = Result<T, IsivolError>;

#[derive(Debug, Error)]
pub enum IsivolError {
    /// Existence check or creation against the cluster failed.
    /// The detail is logged, never returned to the orchestrator.
    #[error("failed to create volume")]
    VolumeCreate,

    #[error("failed to mount volume")]
    VolumeMount,

    #[error("failed to unmount volume")]
    VolumeUnmount,

    #[error("unable to find volume mounted on {}", .0.display())]
    NotMounted(PathBuf),

    #[error("volume in use by other containers")]
    InUse,

    #[error("volume {0} not found")]
    NotFound(String),

    #[error("{} already exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid volume name {0:?}")]
    InvalidName(String),

    /// Local filesystem failure, surfaced verbatim.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("cluster API error: {0}")]
    Cluster(String),

    #[error("mount command error: {0}")]
    Mount(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for IsivolError {
    fn from(err: serde_json::Error) -> Self {
        IsivolError::Protocol(format!("invalid request body: {}", err))
    }
}
