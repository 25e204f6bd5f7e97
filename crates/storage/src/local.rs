use crate::backend::{StorageBackend, StorageMode};
use crate::error::{StorageError, StorageResult};
use crate::file_url::GuideFileUrl;
use crate::kv::KeyValueStore;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use doc_model::{GuideUpload, ProjectState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const PROJECT_STATE_KEY: &str = "guidelens::project-state";
pub const GUIDE_KEY_PREFIX: &str = "guidelens::guide::";

/// Key under which a guide binary is stored.
pub fn guide_key(guide_id: &str) -> String {
    format!("{GUIDE_KEY_PREFIX}{guide_id}")
}

/// Stored form of one guide binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGuideFile {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
    pub base64: String,
    pub updated_at: DateTime<Utc>,
}

/// Fallback backend over a string-keyed local store.
#[derive(Clone)]
pub struct LocalBackend {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBackend").finish_non_exhaustive()
    }
}

impl LocalBackend {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn stored_guide(&self, guide_id: &str) -> StorageResult<StoredGuideFile> {
        let raw = self
            .store
            .get(&guide_key(guide_id))?
            .ok_or_else(|| StorageError::GuideFileNotFound(guide_id.to_owned()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl StorageBackend for LocalBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Local
    }

    fn save_project_state(&self, state: &ProjectState) -> StorageResult<()> {
        self.store.set(PROJECT_STATE_KEY, serde_json::to_string(state)?)
    }

    fn load_project_state(&self) -> StorageResult<Option<ProjectState>> {
        match self.store.get(PROJECT_STATE_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_guide_file(&self, upload: &GuideUpload, guide_id: &str) -> StorageResult<()> {
        let stored = StoredGuideFile {
            mime_type: upload.mime_type.clone(),
            name: upload.file_name.clone(),
            base64: BASE64.encode(&upload.bytes),
            updated_at: Utc::now(),
        };
        self.store.set(&guide_key(guide_id), serde_json::to_string(&stored)?)
    }

    /// Decodes the payload into a temporary file owned by the returned URL.
    fn guide_file_url(&self, guide_id: &str) -> StorageResult<GuideFileUrl> {
        let stored = self.stored_guide(guide_id)?;
        let bytes = BASE64.decode(stored.base64.as_bytes())?;

        let suffix = Path::new(&stored.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        GuideFileUrl::temporary(&bytes, &suffix)
    }
}
