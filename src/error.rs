/// Error types for the greeting card
///
/// Every failure is scoped to the single file or user action that caused it.
/// Nothing in here is fatal to the running application except `AppError`,
/// which only surfaces during startup.

use std::path::PathBuf;
use thiserror::Error;

use crate::state::data::PhotoId;

/// Failures reported by a media store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("blob storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown storage reference: {0}")]
    UnknownStorage(String),

    #[error("photo {0:?} does not exist")]
    NotFound(PhotoId),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Join(err.to_string())
    }
}

/// Why a byte transfer did not yield a storage reference
#[derive(Debug, Error)]
pub enum TransferFailure {
    #[error("transport error: {0}")]
    Transport(#[source] StoreError),

    #[error("store answered with status {0}")]
    Status(u16),

    #[error("malformed transfer response: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// The upload step a file failed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Read,
    Location,
    Transfer,
    Commit,
}

/// Per-file upload failure. Never aborts the rest of the batch.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not obtain a write location: {0}")]
    LocationRequest(#[source] StoreError),

    #[error("upload failed: {0}")]
    Transfer(#[source] TransferFailure),

    #[error("could not save photo details: {0}")]
    Commit(#[source] StoreError),
}

impl UploadError {
    pub fn stage(&self) -> UploadStage {
        match self {
            UploadError::Read { .. } => UploadStage::Read,
            UploadError::LocationRequest(_) => UploadStage::Location,
            UploadError::Transfer(_) => UploadStage::Transfer,
            UploadError::Commit(_) => UploadStage::Commit,
        }
    }
}

/// Deleting a photo from the store failed
#[derive(Debug, Error)]
#[error("could not delete photo {id:?}: {source}")]
pub struct DeleteError {
    pub id: PhotoId,
    #[source]
    pub source: StoreError,
}

/// Loading the configuration file failed
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Startup failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not open photo library: {0}")]
    Library(#[from] StoreError),

    #[error("window system error: {0}")]
    Ui(#[from] iced::Error),
}
