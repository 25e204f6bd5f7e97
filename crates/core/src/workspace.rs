//! Storage bootstrap plus the project store on top of it.

use crate::clock::{Clock, SystemClock};
use crate::config::WorkspaceConfig;
use crate::error::CoreResult;
use crate::store::ProjectStore;
use doc_model::{GuideUpload, ProjectState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::{BootstrapReport, Storage, StorageBackend, StorageMode};
use tracing::{info, warn};

pub struct Workspace {
    storage: Arc<Storage>,
    store: ProjectStore,
    bootstrap: BootstrapReport,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("storage", &self.storage)
            .field("store", &self.store)
            .finish()
    }
}

impl Workspace {
    pub fn open(config: WorkspaceConfig) -> CoreResult<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(config: WorkspaceConfig, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        let storage = match &config.data_dir {
            Some(data_dir) => Storage::with_root(data_dir, config.directory_access),
            None => Storage::from_default_project(config.directory_access)?,
        };
        Ok(Self::with_storage(Arc::new(storage), clock, config))
    }

    /// Rehydrate the remembered directory and load the project from
    /// whichever backend ends up active.
    pub fn with_storage(storage: Arc<Storage>, clock: Arc<dyn Clock>, config: WorkspaceConfig) -> Self {
        let bootstrap = storage.bootstrap();
        info!(mode = %bootstrap.mode, "storage ready");

        let backend: Arc<dyn StorageBackend> = storage.clone();
        let store = ProjectStore::open(backend, clock, config);
        Self { storage, store, bootstrap }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn bootstrap_report(&self) -> &BootstrapReport {
        &self.bootstrap
    }

    pub fn mode(&self) -> StorageMode {
        self.storage.mode()
    }

    pub fn directory(&self) -> Option<PathBuf> {
        self.storage.directory()
    }

    /// Move the project into `root`.
    ///
    /// A directory that already holds a project becomes the current one.
    /// An empty directory receives the current project and its guide files.
    /// The directory only becomes active once it is fully populated; any
    /// failure before that leaves the current backend in place.
    pub fn select_directory(&self, root: impl AsRef<Path>) -> CoreResult<()> {
        self.save_before_switch();
        let candidate = self.storage.authorize_directory(root)?;

        if candidate.load_project_state()?.is_some() {
            info!(root = %candidate.root().display(), "directory already holds a project; loading it");
            self.storage.activate_directory(candidate)?;
            return self.store.reload();
        }

        let current = self.store.snapshot();
        let uploads = self.collect_guide_files(&current);
        for (guide_id, upload) in &uploads {
            candidate.save_guide_file(upload, guide_id)?;
        }
        candidate.save_project_state(&current)?;

        self.storage.activate_directory(candidate)?;
        self.store.reload()?;
        info!(guides = uploads.len(), "copied project into directory");
        Ok(())
    }

    /// Drop the directory and continue from the local store.
    pub fn clear_directory(&self) -> CoreResult<()> {
        self.save_before_switch();
        self.storage.clear_directory()?;
        self.store.reload()
    }

    pub fn shutdown(&self) -> CoreResult<()> {
        self.store.shutdown()
    }

    fn save_before_switch(&self) {
        if let Err(error) = self.store.save_now() {
            warn!(%error, "could not save before switching storage");
        }
    }

    fn collect_guide_files(&self, project: &ProjectState) -> Vec<(String, GuideUpload)> {
        project
            .guides
            .iter()
            .filter_map(|guide| {
                let bytes = self
                    .storage
                    .guide_file_url(&guide.id)
                    .and_then(|url| {
                        let bytes = std::fs::read(url.path())?;
                        url.revoke()?;
                        Ok(bytes)
                    })
                    .inspect_err(|error| warn!(%error, guide_id = %guide.id, "guide file not copied"))
                    .ok()?;
                Some((guide.id.clone(), GuideUpload::new(guide.source_file_name.clone(), bytes)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(data: &Path) -> WorkspaceConfig {
        WorkspaceConfig::default().with_data_dir(data)
    }

    #[test]
    fn empty_directory_receives_current_project() {
        let data = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();

        let workspace = Workspace::open(config(data.path())).unwrap();
        assert_eq!(workspace.mode(), StorageMode::Local);
        let guide = workspace
            .store()
            .upload_guide(GuideUpload::new("report.pdf", b"%PDF-1.7".to_vec()))
            .unwrap();

        workspace.select_directory(project_dir.path()).unwrap();
        assert_eq!(workspace.mode(), StorageMode::Directory);
        assert!(project_dir.path().join("project-state.json").is_file());
        assert!(project_dir.path().join("guides").join(format!("{}.bin", guide.guide_id())).is_file());
    }

    #[test]
    fn directory_with_project_replaces_current_state() {
        let data = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();

        let first = Workspace::open(config(data.path())).unwrap();
        first.select_directory(project_dir.path()).unwrap();
        first.store().upload_guide(GuideUpload::new("a.pdf", b"a".to_vec())).unwrap();
        first.shutdown().unwrap();
        first.clear_directory().unwrap();
        assert!(first.store().snapshot().guides.is_empty());

        first.select_directory(project_dir.path()).unwrap();
        assert_eq!(first.store().snapshot().guides.len(), 1);
    }

    #[test]
    fn malformed_project_file_keeps_local_storage() {
        let data = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        std::fs::write(project_dir.path().join("project-state.json"), "{ not json").unwrap();

        let workspace = Workspace::open(config(data.path())).unwrap();
        workspace.store().upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec())).unwrap();

        assert!(workspace.select_directory(project_dir.path()).is_err());
        assert_eq!(workspace.mode(), StorageMode::Local);
        assert_eq!(workspace.store().snapshot().guides.len(), 1);

        let reopened = Workspace::open(config(data.path())).unwrap();
        assert_eq!(reopened.mode(), StorageMode::Local);
        assert_eq!(reopened.store().snapshot().guides.len(), 1);
    }

    #[test]
    fn failed_guide_copy_keeps_local_storage() {
        let data = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        // A file where the guides directory should go makes every copy fail.
        std::fs::write(project_dir.path().join("guides"), b"").unwrap();

        let workspace = Workspace::open(config(data.path())).unwrap();
        let guide = workspace
            .store()
            .upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec()))
            .unwrap();

        assert!(workspace.select_directory(project_dir.path()).is_err());
        assert_eq!(workspace.mode(), StorageMode::Local);
        assert!(workspace.directory().is_none());
        assert!(!project_dir.path().join("project-state.json").exists());
        assert!(workspace.store().guide_file_url(guide.guide_id()).is_ok());
    }

    #[test]
    fn selection_survives_restart() {
        let data = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();

        {
            let workspace = Workspace::open(config(data.path())).unwrap();
            workspace.select_directory(project_dir.path()).unwrap();
        }

        let reopened = Workspace::open(config(data.path())).unwrap();
        assert_eq!(reopened.mode(), StorageMode::Directory);
        assert!(reopened.bootstrap_report().fallback_reason.is_none());
    }
}
