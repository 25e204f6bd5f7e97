use crate::error::StorageResult;
use crate::kv::KeyValueStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ROOT_DIRECTORY_KEY: &str = "root-directory";

/// Remembers the granted directory between sessions.
#[derive(Clone)]
pub struct HandleStore {
    store: Arc<dyn KeyValueStore>,
}

impl HandleStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The remembered directory, if any.
    pub fn load(&self) -> StorageResult<Option<PathBuf>> {
        Ok(self.store.get(ROOT_DIRECTORY_KEY)?.map(PathBuf::from))
    }

    pub fn save(&self, root: &Path) -> StorageResult<()> {
        self.store.set(ROOT_DIRECTORY_KEY, root.to_string_lossy().into_owned())
    }

    /// Forget the remembered directory.
    pub fn clear(&self) -> StorageResult<()> {
        self.store.remove(ROOT_DIRECTORY_KEY)
    }
}

impl std::fmt::Debug for HandleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleStore").finish_non_exhaustive()
    }
}
