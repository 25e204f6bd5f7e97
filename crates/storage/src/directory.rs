use crate::backend::{StorageBackend, StorageMode};
use crate::error::{StorageError, StorageResult};
use crate::file_url::GuideFileUrl;
use crate::kv::write_atomically;
use doc_model::{GuideUpload, ProjectState};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROJECT_STATE_FILE: &str = "project-state.json";
pub const GUIDES_DIR: &str = "guides";
pub const GUIDE_FILE_EXTENSION: &str = "bin";

/// Backend rooted in a directory the user granted.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    /// Check that `root` is still an existing, writable directory.
    ///
    /// Fails with `StaleAuthorization` otherwise; the caller decides whether
    /// to fall back.
    pub fn authorize(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref();
        let stale = |reason: String| StorageError::StaleAuthorization {
            path: root.to_path_buf(),
            reason,
        };

        let metadata = fs::metadata(root).map_err(|error| stale(error.to_string()))?;
        if !metadata.is_dir() {
            return Err(stale("not a directory".to_owned()));
        }

        let root = fs::canonicalize(root).map_err(|error| stale(error.to_string()))?;
        tempfile::NamedTempFile::new_in(&root)
            .and_then(|probe| probe.close())
            .map_err(|error| stale(format!("not writable: {error}")))?;

        debug!(root = %root.display(), "directory authorized");
        Ok(Self { root })
    }

    /// Canonical path of the granted directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `project-state.json`.
    pub fn state_path(&self) -> PathBuf {
        self.root.join(PROJECT_STATE_FILE)
    }

    /// Path of a guide's binary under `guides/`.
    ///
    /// Ids that could name anything outside that directory are refused.
    pub fn guide_path(&self, guide_id: &str) -> StorageResult<PathBuf> {
        if !is_plain_file_stem(guide_id) {
            return Err(StorageError::InvalidGuideId(guide_id.to_owned()));
        }
        Ok(self.root.join(GUIDES_DIR).join(format!("{guide_id}.{GUIDE_FILE_EXTENSION}")))
    }
}

impl StorageBackend for DirectoryBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Directory
    }

    fn save_project_state(&self, state: &ProjectState) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        write_atomically(&self.state_path(), &bytes)
    }

    fn load_project_state(&self) -> StorageResult<Option<ProjectState>> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save_guide_file(&self, upload: &GuideUpload, guide_id: &str) -> StorageResult<()> {
        write_atomically(&self.guide_path(guide_id)?, &upload.bytes)
    }

    fn guide_file_url(&self, guide_id: &str) -> StorageResult<GuideFileUrl> {
        let path = self.guide_path(guide_id)?;
        if !path.is_file() {
            return Err(StorageError::GuideFileNotFound(guide_id.to_owned()));
        }
        GuideFileUrl::for_path(path)
    }
}

fn is_plain_file_stem(guide_id: &str) -> bool {
    !guide_id.is_empty()
        && guide_id != "."
        && !guide_id.contains("..")
        && !guide_id.contains(['/', '\\', ':', '\0'])
}
