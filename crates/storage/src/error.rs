use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("stored guide payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("no stored file for guide {0}")]
    GuideFileNotFound(String),
    #[error("directory {path} can no longer be used: {reason}")]
    StaleAuthorization { path: PathBuf, reason: String },
    #[error("directory access is not supported in this environment")]
    DirectoryUnsupported,
    #[error("guide id {0:?} cannot name a file")]
    InvalidGuideId(String),
    #[error("cannot express {0} as a file URL")]
    InvalidUrl(PathBuf),
}

pub type StorageResult<T> = Result<T, StorageError>;
