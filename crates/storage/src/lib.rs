pub mod backend;
pub mod directory;
pub mod error;
pub mod file_url;
pub mod handles;
pub mod kv;
pub mod local;

pub use backend::{StorageBackend, StorageMode};
pub use directory::DirectoryBackend;
pub use error::{StorageError, StorageResult};
pub use file_url::GuideFileUrl;
pub use handles::HandleStore;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use local::LocalBackend;

use directories::ProjectDirs;
use doc_model::{GuideUpload, ProjectState};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

pub const LOCAL_STORE_FILE: &str = "local-storage.json";
pub const HANDLE_STORE_FILE: &str = "handles.json";

/// Outcome of rehydrating the remembered directory at startup.
#[derive(Debug)]
pub struct BootstrapReport {
    pub mode: StorageMode,
    pub directory: Option<PathBuf>,
    /// Why the remembered directory was dropped, if it was.
    pub fallback_reason: Option<StorageError>,
}

/// The active backend plus the rules for switching between them.
///
/// A granted directory wins while it stays usable. Otherwise everything
/// goes to the local key-value fallback.
pub struct Storage {
    data_dir: Option<PathBuf>,
    fallback: LocalBackend,
    handles: HandleStore,
    directory_supported: bool,
    directory: RwLock<Option<DirectoryBackend>>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("data_dir", &self.data_dir)
            .field("mode", &self.mode())
            .field("directory_supported", &self.directory_supported)
            .finish()
    }
}

impl Storage {
    /// Storage under the platform data directory for GuideLens.
    pub fn from_default_project(directory_supported: bool) -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "GuideLens", "GuideLens")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self::with_root(dirs.data_local_dir(), directory_supported))
    }

    /// Keep the fallback store and the handle store as files under `data_dir`.
    pub fn with_root(data_dir: impl Into<PathBuf>, directory_supported: bool) -> Self {
        let data_dir = data_dir.into();
        let fallback = Arc::new(FileKeyValueStore::new(data_dir.join(LOCAL_STORE_FILE)));
        let handles = Arc::new(FileKeyValueStore::new(data_dir.join(HANDLE_STORE_FILE)));

        let mut storage = Self::with_stores(fallback, handles, directory_supported);
        storage.data_dir = Some(data_dir);
        storage
    }

    pub fn with_stores(
        fallback: Arc<dyn KeyValueStore>,
        handles: Arc<dyn KeyValueStore>,
        directory_supported: bool,
    ) -> Self {
        Self {
            data_dir: None,
            fallback: LocalBackend::new(fallback),
            handles: HandleStore::new(handles),
            directory_supported,
            directory: RwLock::new(None),
        }
    }

    /// Storage with in-memory stores. Nothing outlives the process.
    pub fn in_memory() -> Self {
        Self::with_stores(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(MemoryKeyValueStore::new()),
            true,
        )
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn is_directory_supported(&self) -> bool {
        self.directory_supported
    }

    pub fn mode(&self) -> StorageMode {
        match *self.read_directory() {
            Some(_) => StorageMode::Directory,
            None => StorageMode::Local,
        }
    }

    /// Root of the active directory, if one is in use.
    pub fn directory(&self) -> Option<PathBuf> {
        self.read_directory().as_ref().map(|backend| backend.root().to_path_buf())
    }

    /// Rehydrate the remembered directory.
    ///
    /// Never fails: an unusable directory clears the remembered handle and
    /// leaves the local fallback active.
    pub fn bootstrap(&self) -> BootstrapReport {
        let remembered = match self.handles.load() {
            Ok(remembered) => remembered,
            Err(error) => {
                warn!(%error, "could not read remembered directory; using local storage");
                return self.report(Some(error));
            }
        };

        let Some(root) = remembered else {
            return self.report(None);
        };

        if !self.directory_supported {
            self.forget_handle();
            warn!(root = %root.display(), "directory access unsupported; using local storage");
            return self.report(Some(StorageError::DirectoryUnsupported));
        }

        match DirectoryBackend::authorize(&root) {
            Ok(backend) => {
                info!(root = %backend.root().display(), "restored project directory");
                *self.write_directory() = Some(backend);
                self.report(None)
            }
            Err(error) => {
                self.forget_handle();
                warn!(%error, "switching to local storage");
                self.report(Some(error))
            }
        }
    }

    /// Grant a directory and remember it for later sessions.
    pub fn select_directory(&self, root: impl AsRef<Path>) -> StorageResult<()> {
        let backend = self.authorize_directory(root)?;
        self.activate_directory(backend)
    }

    /// Check `root` without making it active.
    ///
    /// The returned backend can be populated before
    /// [`activate_directory`](Self::activate_directory) commits to it.
    pub fn authorize_directory(&self, root: impl AsRef<Path>) -> StorageResult<DirectoryBackend> {
        if !self.directory_supported {
            return Err(StorageError::DirectoryUnsupported);
        }
        DirectoryBackend::authorize(root)
    }

    /// Remember `backend` and route every later operation to it.
    ///
    /// The active backend only changes once the handle is saved.
    pub fn activate_directory(&self, backend: DirectoryBackend) -> StorageResult<()> {
        self.handles.save(backend.root())?;
        info!(root = %backend.root().display(), "using project directory");
        *self.write_directory() = Some(backend);
        Ok(())
    }

    pub fn clear_directory(&self) -> StorageResult<()> {
        *self.write_directory() = None;
        self.handles.clear()?;
        info!("using local storage");
        Ok(())
    }

    fn report(&self, fallback_reason: Option<StorageError>) -> BootstrapReport {
        BootstrapReport { mode: self.mode(), directory: self.directory(), fallback_reason }
    }

    fn forget_handle(&self) {
        if let Err(error) = self.handles.clear() {
            warn!(%error, "could not clear remembered directory");
        }
    }

    fn active_directory(&self) -> Option<DirectoryBackend> {
        self.read_directory().clone()
    }

    /// After a failed directory operation, drop the directory if it no
    /// longer authorizes so later writes reach the fallback.
    fn demote_if_stale(&self, backend: &DirectoryBackend) {
        if let Err(error) = DirectoryBackend::authorize(backend.root()) {
            warn!(%error, "project directory became unusable; switching to local storage");
            *self.write_directory() = None;
            self.forget_handle();
        }
    }

    fn with_active<T>(
        &self,
        op: impl Fn(&dyn StorageBackend) -> StorageResult<T>,
    ) -> StorageResult<T> {
        match self.active_directory() {
            Some(backend) => op(&backend).inspect_err(|_| self.demote_if_stale(&backend)),
            None => op(&self.fallback),
        }
    }

    fn read_directory(&self) -> std::sync::RwLockReadGuard<'_, Option<DirectoryBackend>> {
        self.directory.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_directory(&self) -> std::sync::RwLockWriteGuard<'_, Option<DirectoryBackend>> {
        self.directory.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl StorageBackend for Storage {
    fn mode(&self) -> StorageMode {
        Storage::mode(self)
    }

    fn save_project_state(&self, state: &ProjectState) -> StorageResult<()> {
        self.with_active(|backend| backend.save_project_state(state))
    }

    fn load_project_state(&self) -> StorageResult<Option<ProjectState>> {
        self.with_active(|backend| backend.load_project_state())
    }

    fn save_guide_file(&self, upload: &GuideUpload, guide_id: &str) -> StorageResult<()> {
        self.with_active(|backend| backend.save_guide_file(upload, guide_id))
    }

    fn guide_file_url(&self, guide_id: &str) -> StorageResult<GuideFileUrl> {
        self.with_active(|backend| backend.guide_file_url(guide_id))
    }
}
