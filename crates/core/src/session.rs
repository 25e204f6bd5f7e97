//! The guide currently open in the viewer
//!
//! Opening a guide bumps a generation counter. A file resolution started
//! for an older generation is discarded when it completes, and its URL is
//! revoked so temporary copies never pile up.

use crate::error::CoreResult;
use crate::store::ProjectStore;
use doc_model::{GuideId, ProjectState};
use storage::GuideFileUrl;
use tracing::{debug, warn};
use viewer_core::InteractionMachine;

/// A pending resolution of one guide's file URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub guide_id: GuideId,
    pub generation: u64,
}

/// Tracks the open guide, its file URL and the interaction machine.
#[derive(Debug, Default)]
pub struct GuideFileSession {
    generation: u64,
    active: Option<GuideId>,
    current: Option<GuideFileUrl>,
    interaction: InteractionMachine,
}

impl GuideFileSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_guide(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// URL of the active guide once its resolution completed.
    pub fn current_url(&self) -> Option<&GuideFileUrl> {
        self.current.as_ref()
    }

    pub fn interaction(&self) -> &InteractionMachine {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut InteractionMachine {
        &mut self.interaction
    }

    /// Make `guide_id` the active guide.
    ///
    /// Revokes the previous URL and resets interaction. The returned request
    /// must be passed to [`complete`](Self::complete) once resolved.
    pub fn switch_to(&mut self, guide_id: &str) -> FileRequest {
        self.generation += 1;
        self.release_current();
        self.interaction.reset();
        self.active = Some(guide_id.to_owned());

        debug!(guide_id, generation = self.generation, "switching guide");
        FileRequest { guide_id: guide_id.to_owned(), generation: self.generation }
    }

    /// Close the active guide, revoking its URL.
    pub fn close(&mut self) {
        self.generation += 1;
        self.release_current();
        self.interaction.reset();
        self.active = None;
    }

    /// True when `request` is for the active guide and its latest switch.
    pub fn is_current(&self, request: &FileRequest) -> bool {
        request.generation == self.generation && self.active.as_deref() == Some(request.guide_id.as_str())
    }

    /// Accept the outcome of `request`.
    ///
    /// Returns `Ok(None)` for a request that was superseded; a URL it
    /// produced is revoked.
    pub fn complete(
        &mut self,
        request: &FileRequest,
        result: CoreResult<GuideFileUrl>,
    ) -> CoreResult<Option<&GuideFileUrl>> {
        if !self.is_current(request) {
            debug!(guide_id = %request.guide_id, generation = request.generation, "discarding stale file resolution");
            if let Ok(url) = result {
                revoke(url);
            }
            return Ok(None);
        }

        let url = result?;
        self.release_current();
        let current: &GuideFileUrl = self.current.insert(url);
        Ok(Some(current))
    }

    /// Resolve `request` against `store` and complete it.
    pub fn resolve(&mut self, store: &ProjectStore, request: &FileRequest) -> CoreResult<Option<&GuideFileUrl>> {
        let result = store.guide_file_url(&request.guide_id);
        self.complete(request, result)
    }

    /// Follow removals in `project`: close a deleted guide and any popover
    /// whose entity is gone.
    pub fn reconcile(&mut self, project: &ProjectState) {
        if let Some(guide_id) = self.active.as_deref() {
            if !project.has_guide(guide_id) {
                debug!(guide_id, "active guide was removed");
                self.close();
                return;
            }
        }
        self.interaction.reconcile(project);
    }

    fn release_current(&mut self) {
        if let Some(url) = self.current.take() {
            revoke(url);
        }
    }
}

fn revoke(url: GuideFileUrl) {
    if let Err(error) = url.revoke() {
        warn!(%error, "could not revoke guide file url");
    }
}
