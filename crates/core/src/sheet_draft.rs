//! Local drafts of one guide's analysis sheets
//!
//! Typing into a sheet edits the draft only. After `sheet_debounce` of
//! quiet the draft merges into the project by replacing every sheet of
//! the guide, so a burst of keystrokes costs one project mutation.

use crate::clock::Clock;
use crate::error::CoreResult;
use crate::store::ProjectStore;
use crate::write_coordinator::WriteSchedule;
use doc_model::{
    sheets_for_guide, AnalysisSheet, DimensionId, GuideId, ModelError, ModelResult, NoteField,
    ProjectAction, CUSTOM_DIMENSION_PREFIX,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct SheetDraft {
    store: ProjectStore,
    clock: Arc<dyn Clock>,
    debounce: Duration,
    guide_id: GuideId,
    sheets: Vec<AnalysisSheet>,
    /// Dimensions that already had a stored sheet or were edited here.
    keep: HashSet<DimensionId>,
    schedule: WriteSchedule,
}

impl std::fmt::Debug for SheetDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetDraft")
            .field("guide_id", &self.guide_id)
            .field("sheets", &self.sheets.len())
            .field("pending", &self.schedule.has_pending_changes())
            .finish()
    }
}

impl SheetDraft {
    pub fn open(store: &ProjectStore, guide_id: &str) -> CoreResult<Self> {
        let (sheets, keep) = store.read(|project| {
            if !project.has_guide(guide_id) {
                return Err(ModelError::UnknownGuide(guide_id.to_owned()));
            }
            let keep = project
                .analysis_sheets
                .iter()
                .filter(|sheet| sheet.guide_id == guide_id)
                .map(|sheet| sheet.dimension_id.clone())
                .collect::<HashSet<_>>();
            Ok((sheets_for_guide(project, guide_id), keep))
        })?;

        Ok(Self {
            store: store.clone(),
            clock: Arc::clone(store.clock()),
            debounce: store.config().sheet_debounce,
            guide_id: guide_id.to_owned(),
            sheets,
            keep,
            schedule: WriteSchedule::new(),
        })
    }

    pub fn guide_id(&self) -> &str {
        &self.guide_id
    }

    pub fn sheets(&self) -> &[AnalysisSheet] {
        &self.sheets
    }

    pub fn sheet(&self, dimension_id: &str) -> Option<&AnalysisSheet> {
        self.sheets.iter().find(|sheet| sheet.dimension_id == dimension_id)
    }

    pub fn has_pending_changes(&self) -> bool {
        self.schedule.has_pending_changes()
    }

    pub fn set_field(&mut self, dimension_id: &str, field: NoteField, value: impl Into<String>) -> ModelResult<()> {
        field.set(&mut self.sheet_mut(dimension_id)?.notes, value.into());
        self.touch(dimension_id);
        Ok(())
    }

    /// Returns `false` for blank or duplicate codes.
    pub fn add_emergent_code(&mut self, dimension_id: &str, code: &str) -> ModelResult<bool> {
        let added = self.sheet_mut(dimension_id)?.notes.add_emergent_code(code);
        if added {
            self.touch(dimension_id);
        }
        Ok(added)
    }

    pub fn remove_emergent_code(&mut self, dimension_id: &str, code: &str) -> ModelResult<bool> {
        let codes = &mut self.sheet_mut(dimension_id)?.notes.emergent_codes;
        let before = codes.len();
        codes.retain(|existing| existing != code);
        let removed = codes.len() != before;
        if removed {
            self.touch(dimension_id);
        }
        Ok(removed)
    }

    /// Set a display title. An empty title restores the default one.
    pub fn rename(&mut self, dimension_id: &str, title: &str) -> ModelResult<()> {
        let title = title.trim();
        self.sheet_mut(dimension_id)?.custom_title = (!title.is_empty()).then(|| title.to_owned());
        self.touch(dimension_id);
        Ok(())
    }

    pub fn add_custom_dimension(&mut self, title: &str) -> ModelResult<DimensionId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ModelError::EmptyInput("dimension title"));
        }

        let dimension_id = format!("{CUSTOM_DIMENSION_PREFIX}{}", doc_model::new_id());
        self.sheets.push(AnalysisSheet {
            custom_title: Some(title.to_owned()),
            is_custom_dimension: Some(true),
            ..AnalysisSheet::blank(&self.guide_id, &dimension_id)
        });
        self.touch(&dimension_id);
        Ok(dimension_id)
    }

    /// Merge into the project once the debounce window has passed.
    pub fn tick(&mut self) -> CoreResult<bool> {
        if !self.schedule.is_due(self.clock.now()) {
            return Ok(false);
        }
        self.merge()
    }

    /// Merge now, regardless of the timer.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.schedule.cancel();
        self.merge().map(|_| ())
    }

    fn merge(&mut self) -> CoreResult<bool> {
        let Some(generation) = self.schedule.begin_write() else {
            return Ok(false);
        };

        let sheets: Vec<AnalysisSheet> = self
            .sheets
            .iter()
            .filter(|sheet| self.keep.contains(&sheet.dimension_id))
            .cloned()
            .collect();
        let count = sheets.len();

        let result = self
            .store
            .apply(ProjectAction::ReplaceGuideSheets { guide_id: self.guide_id.clone(), sheets });
        let succeeded = result.is_ok();
        self.schedule.finish_write(generation, succeeded, self.clock.now(), self.debounce);

        result?;
        debug!(guide_id = %self.guide_id, sheets = count, "merged sheet draft");
        Ok(true)
    }

    fn sheet_mut(&mut self, dimension_id: &str) -> ModelResult<&mut AnalysisSheet> {
        let guide_id = &self.guide_id;
        self.sheets
            .iter_mut()
            .find(|sheet| sheet.dimension_id == dimension_id)
            .ok_or_else(|| ModelError::UnknownDimension {
                guide_id: guide_id.clone(),
                dimension_id: dimension_id.to_owned(),
            })
    }

    fn touch(&mut self, dimension_id: &str) {
        self.keep.insert(dimension_id.to_owned());
        self.schedule.mark_dirty(self.clock.now(), self.debounce);
    }
}

impl Drop for SheetDraft {
    fn drop(&mut self) {
        if self.schedule.has_pending_changes() {
            if let Err(error) = self.flush() {
                warn!(%error, guide_id = %self.guide_id, "sheet draft dropped with unsaved changes");
            }
        }
    }
}
