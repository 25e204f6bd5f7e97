use crate::error::StorageResult;
use crate::file_url::GuideFileUrl;
use doc_model::{GuideUpload, ProjectState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// Files inside a directory the user granted.
    Directory,
    /// Entries in the local key-value store.
    Local,
}

impl StorageMode {
    /// Name reported by status output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Local => "local",
        }
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable home for the project state and the uploaded guide binaries.
pub trait StorageBackend: Send + Sync {
    fn mode(&self) -> StorageMode;

    fn save_project_state(&self, state: &ProjectState) -> StorageResult<()>;

    /// `Ok(None)` when nothing was saved yet.
    fn load_project_state(&self) -> StorageResult<Option<ProjectState>>;

    fn save_guide_file(&self, upload: &GuideUpload, guide_id: &str) -> StorageResult<()>;

    /// The caller owns the returned URL and revokes it when done.
    fn guide_file_url(&self, guide_id: &str) -> StorageResult<GuideFileUrl>;
}
