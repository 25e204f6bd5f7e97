//! Project state reconciliation
//!
//! `ProjectStore` owns the one in-memory `ProjectState`. Every committed
//! mutation stamps `updatedAt` and pushes the debounced write out by the
//! configured window. Writes snapshot the state under the lock and hit the
//! backend outside it, so a slow disk never blocks edits.

use crate::clock::Clock;
use crate::config::WorkspaceConfig;
use crate::error::{CoreError, CoreResult};
use crate::import::parse_project_state;
use crate::write_coordinator::{AutoSaveWorker, WriteSchedule};
use doc_model::{
    apply_project_action, guide_from_upload, ActionOutcome, GuideId, GuideUpload, ModelError,
    ProjectAction, ProjectState, Timestamp,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use storage::{GuideFileUrl, StorageBackend, StorageMode};
use tracing::{debug, error, info, warn};
use viewer_core::InteractionIntent;

/// Snapshot of the persistence status for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStatus {
    /// The initial load finished, successfully or not.
    pub is_ready: bool,
    /// A backend write is in flight.
    pub is_saving: bool,
    /// Committed edits not yet written.
    pub has_pending_changes: bool,
    pub last_saved_at: Option<Timestamp>,
    /// Message of the most recent failed load or write; cleared by the next success.
    pub last_error: Option<String>,
}

/// Result of [`ProjectStore::upload_guide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// A new guide was added.
    Created(GuideId),
    /// Identical bytes were uploaded before.
    Existing(GuideId),
}

impl UploadOutcome {
    /// Id of the new or matching guide.
    pub fn guide_id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Existing(id) => id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

struct StoreState {
    project: ProjectState,
    schedule: WriteSchedule,
    is_ready: bool,
    last_saved_at: Option<Timestamp>,
    last_error: Option<String>,
}

struct Inner {
    state: Mutex<StoreState>,
    /// Held for the duration of one backend write.
    flush: Mutex<()>,
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    config: WorkspaceConfig,
}

/// Shared handle to the project state. Cheap to clone.
#[derive(Clone)]
pub struct ProjectStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("mode", &self.inner.backend.mode())
            .field("status", &self.status())
            .finish()
    }
}

impl ProjectStore {
    /// Load the saved project from `backend`.
    ///
    /// A missing or unreadable project starts empty; the read error is
    /// kept in [`SaveStatus::last_error`].
    pub fn open(
        backend: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
        config: WorkspaceConfig,
    ) -> Self {
        let (project, last_error) = match backend.load_project_state() {
            Ok(Some(project)) => {
                info!(guides = project.guides.len(), mode = %backend.mode(), "loaded project");
                (project, None)
            }
            Ok(None) => {
                debug!(mode = %backend.mode(), "no saved project; starting empty");
                (ProjectState::empty_at(clock.wall_now()), None)
            }
            Err(error) => {
                error!(%error, mode = %backend.mode(), "could not load project; starting empty");
                (ProjectState::empty_at(clock.wall_now()), Some(error.to_string()))
            }
        };

        let state = StoreState {
            project,
            schedule: WriteSchedule::new(),
            is_ready: true,
            last_saved_at: None,
            last_error,
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                flush: Mutex::new(()),
                backend,
                clock,
                config,
            }),
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.inner.config
    }

    /// Which backend the store writes to.
    pub fn mode(&self) -> StorageMode {
        self.inner.backend.mode()
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.inner.backend
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ProjectState {
        self.lock().project.clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&ProjectState) -> R) -> R {
        f(&self.lock().project)
    }

    /// Current persistence status.
    pub fn status(&self) -> SaveStatus {
        let state = self.lock();
        SaveStatus {
            is_ready: state.is_ready,
            is_saving: state.schedule.is_writing(),
            has_pending_changes: state.schedule.has_pending_changes(),
            last_saved_at: state.last_saved_at,
            last_error: state.last_error.clone(),
        }
    }

    /// Replace the state with `f(state)`.
    ///
    /// `f` receives a copy; if it panics the stored state is left as it was.
    pub fn update(&self, f: impl FnOnce(ProjectState) -> ProjectState) {
        let now = self.inner.clock.now();
        let wall_now = self.inner.clock.wall_now();
        let mut state = self.lock();

        let mut next = f(state.project.clone());
        next.updated_at = wall_now;
        state.project = next;
        state.schedule.mark_dirty(now, self.inner.config.debounce);
    }

    /// Run `f` on a working copy and commit it only if `f` succeeds.
    pub fn try_update<T, E>(&self, f: impl FnOnce(&mut ProjectState) -> Result<T, E>) -> Result<T, E> {
        self.commit_with(f, |_| true)
    }

    /// Apply one project action. No-op outcomes leave the state untouched.
    pub fn apply(&self, action: ProjectAction) -> CoreResult<ActionOutcome> {
        let now = self.inner.clock.wall_now();
        let outcome = self.commit_with(
            |project| apply_project_action(project, action, now),
            ActionOutcome::changed_state,
        )?;
        Ok(outcome)
    }

    /// Apply a gesture's intent to `guide_id`.
    ///
    /// A highlight with a chained tag attach commits both or neither.
    pub fn apply_intent(&self, guide_id: &str, intent: &InteractionIntent) -> CoreResult<ActionOutcome> {
        let now = self.inner.clock.wall_now();
        let action = intent.to_action(guide_id);
        let attachment = intent.chained_attachment().cloned();

        let outcome = self.commit_with(
            |project| -> Result<ActionOutcome, ModelError> {
                let outcome = apply_project_action(project, action, now)?;
                if let (Some(attach), ActionOutcome::Created(highlight_id)) = (attachment, &outcome) {
                    apply_project_action(
                        project,
                        ProjectAction::AttachTag {
                            tag_id: attach.tag_id,
                            highlight_id: highlight_id.clone(),
                            comment: attach.comment,
                        },
                        now,
                    )?;
                }
                Ok(outcome)
            },
            ActionOutcome::changed_state,
        )?;
        Ok(outcome)
    }

    /// Add a guide from uploaded bytes, storing the binary first.
    pub fn upload_guide(&self, upload: GuideUpload) -> CoreResult<UploadOutcome> {
        let fingerprint = upload.fingerprint();
        let existing =
            self.read(|project| project.find_guide_by_fingerprint(&fingerprint).map(|g| g.id.clone()));
        if let Some(guide_id) = existing {
            debug!(guide_id = %guide_id, "upload matches an existing guide");
            return Ok(UploadOutcome::Existing(guide_id));
        }

        let guide = guide_from_upload(&upload, self.inner.clock.wall_now());
        if guide.title.trim().is_empty() {
            return Err(ModelError::EmptyInput("guide title").into());
        }
        self.inner.backend.save_guide_file(&upload, &guide.id)?;
        info!(guide_id = %guide.id, file = %upload.file_name, bytes = upload.bytes.len(), "stored guide file");

        let guide_id = guide.id.clone();
        match self.apply(ProjectAction::AddGuide { guide })? {
            ActionOutcome::Existing(id) => Ok(UploadOutcome::Existing(id)),
            _ => Ok(UploadOutcome::Created(guide_id)),
        }
    }

    /// Resolve the stored binary of a known guide.
    pub fn guide_file_url(&self, guide_id: &str) -> CoreResult<GuideFileUrl> {
        if !self.read(|project| project.has_guide(guide_id)) {
            return Err(ModelError::UnknownGuide(guide_id.to_owned()).into());
        }
        Ok(self.inner.backend.guide_file_url(guide_id)?)
    }

    /// Swap in a whole new state, e.g. after import, and schedule its write.
    ///
    /// Stamps `updatedAt` like any other committed mutation.
    pub fn replace_state(&self, mut project: ProjectState) {
        let now = self.inner.clock.now();
        project.updated_at = self.inner.clock.wall_now();
        let mut state = self.lock();
        state.project = project;
        state.schedule.mark_dirty(now, self.inner.config.debounce);
    }

    /// Validate an exported project and make it current.
    ///
    /// A rejected document leaves the state untouched.
    pub fn import_json(&self, json: &str) -> CoreResult<()> {
        let project = parse_project_state(json)?;
        info!(guides = project.guides.len(), "imported project");
        self.replace_state(project);
        Ok(())
    }

    /// Re-read from the backend, discarding unsaved edits.
    pub fn reload(&self) -> CoreResult<()> {
        let loaded = self.inner.backend.load_project_state()?;
        let project = loaded.unwrap_or_else(|| ProjectState::empty_at(self.inner.clock.wall_now()));

        let mut state = self.lock();
        if state.schedule.has_pending_changes() {
            warn!("reload discards unsaved changes");
        }
        state.project = project;
        state.schedule.reset();
        state.last_error = None;
        Ok(())
    }

    /// Write if the debounce window has passed. Returns whether a write ran.
    pub fn tick(&self) -> bool {
        let now = self.inner.clock.now();
        if !self.lock().schedule.is_due(now) {
            return false;
        }
        matches!(self.flush(), Ok(true))
    }

    /// Write pending changes now, cancelling the timer.
    pub fn save_now(&self) -> CoreResult<()> {
        self.lock().schedule.cancel();
        self.flush().map(|_| ())
    }

    /// Flush pending writes before the store goes away.
    pub fn shutdown(&self) -> CoreResult<()> {
        if self.status().has_pending_changes {
            debug!("flushing pending changes on shutdown");
        }
        self.save_now()
    }

    /// Background thread that calls [`tick`](Self::tick) on the configured interval.
    pub fn spawn_auto_save(&self) -> CoreResult<AutoSaveWorker> {
        let store = self.clone();
        AutoSaveWorker::spawn(self.inner.config.auto_save_interval, move || {
            store.tick();
        })
        .map_err(CoreError::AutoSave)
    }

    fn flush(&self) -> CoreResult<bool> {
        let _flush = self.inner.flush.lock().unwrap_or_else(PoisonError::into_inner);

        let (generation, snapshot) = {
            let mut state = self.lock();
            let Some(generation) = state.schedule.begin_write() else {
                return Ok(false);
            };
            (generation, state.project.clone())
        };

        let result = self.inner.backend.save_project_state(&snapshot);

        let mut state = self.lock();
        let now = self.inner.clock.now();
        match result {
            Ok(()) => {
                state.schedule.finish_write(generation, true, now, self.inner.config.debounce);
                state.last_saved_at = Some(self.inner.clock.wall_now());
                state.last_error = None;
                debug!(generation, mode = %self.inner.backend.mode(), "project saved");
                Ok(true)
            }
            Err(error) => {
                state.schedule.finish_write(generation, false, now, self.inner.config.debounce);
                state.last_error = Some(error.to_string());
                error!(%error, generation, "failed to save project");
                Err(error.into())
            }
        }
    }

    fn commit_with<T, E>(
        &self,
        f: impl FnOnce(&mut ProjectState) -> Result<T, E>,
        changed: impl FnOnce(&T) -> bool,
    ) -> Result<T, E> {
        let now = self.inner.clock.now();
        let wall_now = self.inner.clock.wall_now();
        let mut state = self.lock();

        let mut working = state.project.clone();
        let value = f(&mut working)?;
        if changed(&value) {
            working.updated_at = wall_now;
            state.project = working;
            state.schedule.mark_dirty(now, self.inner.config.debounce);
        }
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
