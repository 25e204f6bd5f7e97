//! Project actions
//!
//! Every change to a `ProjectState` is expressed as a `ProjectAction` and
//! applied by [`apply_project_action`]. Actions validate their input before
//! mutating anything, so a rejected action leaves the state untouched.

use crate::dimensions::{find_dimension, CUSTOM_DIMENSION_PREFIX};
use crate::error::{ModelError, ModelResult};
use crate::geometry::{points_to_path, NormalizedPoint, NormalizedRect};
use crate::project::{
    new_id, AnalysisSheet, AnalysisSheetNotes, DimensionId, DrawingAnnotation, GuideDocument,
    GuideId, GuideStatus, Highlight, HighlightId, LinkAnchor, ProjectState, Tag, TagId, TagLink,
    TagLinkId, Timestamp,
};
use crate::query::TagIndex;

/// Color given to tags created without an explicit one.
pub const DEFAULT_TAG_COLOR: &str = "#0ea5e9";

/// Request to create a highlight from a captured selection.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHighlight {
    pub guide_id: GuideId,
    pub dimension_id: DimensionId,
    pub indicator_id: Option<String>,
    pub text: String,
    pub page_number: u32,
    pub rects: Vec<NormalizedRect>,
    pub start_offset: Option<u32>,
    pub end_offset: Option<u32>,
    pub comment: Option<String>,
}

/// Partial update of guide metadata. `None` leaves a field unchanged; an
/// empty string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuidePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
    pub status: Option<GuideStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Descriptive,
    Quotations,
    Interpretive,
    Memo,
}

impl NoteField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "descriptive" => Some(Self::Descriptive),
            "quotations" => Some(Self::Quotations),
            "interpretive" => Some(Self::Interpretive),
            "memo" => Some(Self::Memo),
            _ => None,
        }
    }

    pub fn set(self, notes: &mut AnalysisSheetNotes, value: String) {
        match self {
            Self::Descriptive => notes.descriptive = value,
            Self::Quotations => notes.quotations = value,
            Self::Interpretive => notes.interpretive = value,
            Self::Memo => notes.memo = (!value.is_empty()).then_some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectAction {
    AddGuide { guide: GuideDocument },
    UpdateGuide { guide_id: GuideId, patch: GuidePatch },
    RemoveGuide { guide_id: GuideId },
    CreateHighlight(NewHighlight),
    UpdateHighlightComment { highlight_id: HighlightId, comment: Option<String> },
    RemoveHighlight { highlight_id: HighlightId },
    CreateTag { guide_id: GuideId, dimension_id: DimensionId, label: String, color: Option<String> },
    AttachTag { tag_id: TagId, highlight_id: HighlightId, comment: Option<String> },
    /// `tag_id: None` places the first tag available on the guide.
    CreateTagPin {
        guide_id: GuideId,
        tag_id: Option<TagId>,
        page_number: u32,
        position: NormalizedPoint,
        comment: Option<String>,
    },
    UpdateTagLinkComment { tag_id: TagId, link_id: TagLinkId, comment: String },
    RemoveTagLink { tag_id: TagId, link_id: TagLinkId },
    AddDrawing { guide_id: GuideId, page_number: u32, points: Vec<NormalizedPoint> },
    RemoveDrawing { drawing_id: String },
    AddCustomDimension { guide_id: GuideId, title: String },
    RenameDimension { guide_id: GuideId, dimension_id: DimensionId, title: String },
    UpdateSheetNotes { guide_id: GuideId, dimension_id: DimensionId, field: NoteField, value: String },
    AddEmergentCode { guide_id: GuideId, dimension_id: DimensionId, code: String },
    ReplaceGuideSheets { guide_id: GuideId, sheets: Vec<AnalysisSheet> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A new entity was created; carries its id.
    Created(String),
    /// The entity already existed (upload de-duplication); carries its id.
    Existing(String),
    Updated,
    Removed,
    /// Input did not describe anything to do (collapsed selection, tap stroke).
    Ignored,
}

impl ActionOutcome {
    pub fn changed_state(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Updated | Self::Removed)
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::Created(id) | Self::Existing(id) => Some(id),
            _ => None,
        }
    }
}

pub fn apply_project_action(
    state: &mut ProjectState,
    action: ProjectAction,
    now: Timestamp,
) -> ModelResult<ActionOutcome> {
    match action {
        ProjectAction::AddGuide { guide } => add_guide(state, guide),
        ProjectAction::UpdateGuide { guide_id, patch } => update_guide(state, &guide_id, patch, now),
        ProjectAction::RemoveGuide { guide_id } => remove_guide(state, &guide_id),
        ProjectAction::CreateHighlight(request) => create_highlight(state, request, now),
        ProjectAction::UpdateHighlightComment { highlight_id, comment } => {
            let highlight = state
                .highlights
                .iter_mut()
                .find(|highlight| highlight.id == highlight_id)
                .ok_or(ModelError::UnknownHighlight(highlight_id))?;
            highlight.comment = comment.filter(|comment| !comment.trim().is_empty());
            Ok(ActionOutcome::Updated)
        }
        ProjectAction::RemoveHighlight { highlight_id } => remove_highlight(state, &highlight_id),
        ProjectAction::CreateTag { guide_id, dimension_id, label, color } => {
            create_tag(state, guide_id, dimension_id, &label, color, now)
        }
        ProjectAction::AttachTag { tag_id, highlight_id, comment } => {
            attach_tag(state, &tag_id, &highlight_id, comment, now)
        }
        ProjectAction::CreateTagPin { guide_id, tag_id, page_number, position, comment } => {
            create_tag_pin(state, &guide_id, tag_id, page_number, position, comment, now)
        }
        ProjectAction::UpdateTagLinkComment { tag_id, link_id, comment } => {
            let link = find_link_mut(state, &tag_id, &link_id)?;
            link.comment = Some(comment);
            Ok(ActionOutcome::Updated)
        }
        ProjectAction::RemoveTagLink { tag_id, link_id } => {
            find_link_mut(state, &tag_id, &link_id)?;
            if let Some(tag) = state.tag_mut(&tag_id) {
                tag.links.retain(|link| link.id != link_id);
            }
            Ok(ActionOutcome::Removed)
        }
        ProjectAction::AddDrawing { guide_id, page_number, points } => {
            require_guide(state, &guide_id)?;
            if points.len() < 2 || page_number == 0 {
                return Ok(ActionOutcome::Ignored);
            }
            let id = new_id();
            state.drawings.push(DrawingAnnotation {
                id: id.clone(),
                guide_id,
                page_number,
                data: points_to_path(&points),
                created_at: now,
            });
            Ok(ActionOutcome::Created(id))
        }
        ProjectAction::RemoveDrawing { drawing_id } => {
            let before = state.drawings.len();
            state.drawings.retain(|drawing| drawing.id != drawing_id);
            if state.drawings.len() == before {
                return Err(ModelError::UnknownDrawing(drawing_id));
            }
            Ok(ActionOutcome::Removed)
        }
        ProjectAction::AddCustomDimension { guide_id, title } => {
            require_guide(state, &guide_id)?;
            let title = title.trim();
            if title.is_empty() {
                return Err(ModelError::EmptyInput("dimension title"));
            }
            let dimension_id = format!("{CUSTOM_DIMENSION_PREFIX}{}", new_id());
            state.analysis_sheets.push(AnalysisSheet {
                guide_id,
                dimension_id: dimension_id.clone(),
                notes: AnalysisSheetNotes::default(),
                custom_title: Some(title.to_owned()),
                is_custom_dimension: Some(true),
            });
            Ok(ActionOutcome::Created(dimension_id))
        }
        ProjectAction::RenameDimension { guide_id, dimension_id, title } => {
            let sheet = sheet_entry(state, &guide_id, &dimension_id)?;
            let title = title.trim();
            sheet.custom_title = (!title.is_empty()).then(|| title.to_owned());
            Ok(ActionOutcome::Updated)
        }
        ProjectAction::UpdateSheetNotes { guide_id, dimension_id, field, value } => {
            let sheet = sheet_entry(state, &guide_id, &dimension_id)?;
            field.set(&mut sheet.notes, value);
            Ok(ActionOutcome::Updated)
        }
        ProjectAction::AddEmergentCode { guide_id, dimension_id, code } => {
            if code.trim().is_empty() {
                return Err(ModelError::EmptyInput("emergent code"));
            }
            let sheet = sheet_entry(state, &guide_id, &dimension_id)?;
            if sheet.notes.add_emergent_code(&code) {
                Ok(ActionOutcome::Updated)
            } else {
                Ok(ActionOutcome::Ignored)
            }
        }
        ProjectAction::ReplaceGuideSheets { guide_id, sheets } => {
            require_guide(state, &guide_id)?;
            replace_guide_sheets(state, &guide_id, sheets);
            Ok(ActionOutcome::Updated)
        }
    }
}

/// Replace every sheet of `guide_id` with `sheets`.
///
/// Sheets of other guides are untouched. Entries in `sheets` that name a
/// different guide are dropped.
pub fn replace_guide_sheets(state: &mut ProjectState, guide_id: &str, sheets: Vec<AnalysisSheet>) {
    state.analysis_sheets.retain(|sheet| sheet.guide_id != guide_id);
    state
        .analysis_sheets
        .extend(sheets.into_iter().filter(|sheet| sheet.guide_id == guide_id));
}

fn require_guide(state: &ProjectState, guide_id: &str) -> ModelResult<()> {
    if state.has_guide(guide_id) {
        Ok(())
    } else {
        Err(ModelError::UnknownGuide(guide_id.to_owned()))
    }
}

fn add_guide(state: &mut ProjectState, guide: GuideDocument) -> ModelResult<ActionOutcome> {
    if guide.title.trim().is_empty() {
        return Err(ModelError::EmptyInput("guide title"));
    }

    if let Some(fingerprint) = guide.fingerprint.as_deref() {
        if let Some(existing) = state.find_guide_by_fingerprint(fingerprint) {
            return Ok(ActionOutcome::Existing(existing.id.clone()));
        }
    }
    if let Some(existing) = state.guide(&guide.id) {
        return Ok(ActionOutcome::Existing(existing.id.clone()));
    }

    let id = guide.id.clone();
    state.guides.push(guide);
    Ok(ActionOutcome::Created(id))
}

fn update_guide(
    state: &mut ProjectState,
    guide_id: &str,
    patch: GuidePatch,
    now: Timestamp,
) -> ModelResult<ActionOutcome> {
    if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(ModelError::EmptyInput("guide title"));
    }

    let guide =
        state.guide_mut(guide_id).ok_or_else(|| ModelError::UnknownGuide(guide_id.to_owned()))?;

    let optional = |value: String| {
        let value = value.trim().to_owned();
        (!value.is_empty()).then_some(value)
    };

    if let Some(title) = patch.title {
        guide.title = title.trim().to_owned();
    }
    if let Some(description) = patch.description {
        guide.description = optional(description);
    }
    if let Some(institution) = patch.institution {
        guide.institution = optional(institution);
    }
    if let Some(year) = patch.year {
        guide.year = optional(year);
    }
    if let Some(status) = patch.status {
        guide.status = status;
    }
    guide.updated_at = now;

    Ok(ActionOutcome::Updated)
}

fn remove_guide(state: &mut ProjectState, guide_id: &str) -> ModelResult<ActionOutcome> {
    require_guide(state, guide_id)?;

    state.guides.retain(|guide| guide.id != guide_id);
    state.highlights.retain(|highlight| highlight.guide_id != guide_id);
    state.tags.retain(|tag| tag.guide_id != guide_id);
    state.drawings.retain(|drawing| drawing.guide_id != guide_id);
    state.analysis_sheets.retain(|sheet| sheet.guide_id != guide_id);

    Ok(ActionOutcome::Removed)
}

fn create_highlight(
    state: &mut ProjectState,
    request: NewHighlight,
    now: Timestamp,
) -> ModelResult<ActionOutcome> {
    require_guide(state, &request.guide_id)?;

    let text = request.text.trim();
    if text.is_empty() || request.page_number == 0 {
        return Ok(ActionOutcome::Ignored);
    }

    let rects: Vec<NormalizedRect> =
        request.rects.iter().filter_map(NormalizedRect::clipped_to_page).collect();
    if rects.is_empty() {
        return Ok(ActionOutcome::Ignored);
    }

    let id = new_id();
    state.highlights.push(Highlight {
        id: id.clone(),
        guide_id: request.guide_id,
        dimension_id: request.dimension_id,
        indicator_id: request.indicator_id,
        text: text.to_owned(),
        page_number: request.page_number,
        start_offset: request.start_offset,
        end_offset: request.end_offset,
        comment: request.comment.filter(|comment| !comment.trim().is_empty()),
        created_at: now,
        rects,
    });

    Ok(ActionOutcome::Created(id))
}

fn remove_highlight(state: &mut ProjectState, highlight_id: &str) -> ModelResult<ActionOutcome> {
    if state.highlight(highlight_id).is_none() {
        return Err(ModelError::UnknownHighlight(highlight_id.to_owned()));
    }

    state.highlights.retain(|highlight| highlight.id != highlight_id);
    for tag in &mut state.tags {
        tag.links.retain(|link| link.anchor.highlight_id() != Some(highlight_id));
    }

    Ok(ActionOutcome::Removed)
}

fn create_tag(
    state: &mut ProjectState,
    guide_id: GuideId,
    dimension_id: DimensionId,
    label: &str,
    color: Option<String>,
    now: Timestamp,
) -> ModelResult<ActionOutcome> {
    require_guide(state, &guide_id)?;

    let label = label.trim();
    if label.is_empty() {
        return Err(ModelError::EmptyInput("tag label"));
    }

    let color = color
        .map(|color| color.trim().to_owned())
        .filter(|color| !color.is_empty())
        .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_owned());

    let id = new_id();
    state.tags.push(Tag {
        id: id.clone(),
        guide_id,
        dimension_id,
        label: label.to_owned(),
        color,
        links: Vec::new(),
        created_at: now,
    });

    Ok(ActionOutcome::Created(id))
}

fn attach_tag(
    state: &mut ProjectState,
    tag_id: &str,
    highlight_id: &str,
    comment: Option<String>,
    now: Timestamp,
) -> ModelResult<ActionOutcome> {
    let highlight = state
        .highlight(highlight_id)
        .ok_or_else(|| ModelError::UnknownHighlight(highlight_id.to_owned()))?;
    let (highlight_guide, page_number) = (highlight.guide_id.clone(), highlight.page_number);

    let tag = state.tag_mut(tag_id).ok_or_else(|| ModelError::UnknownTag(tag_id.to_owned()))?;
    if tag.guide_id != highlight_guide {
        return Err(ModelError::GuideMismatch {
            tag_id: tag_id.to_owned(),
            tag_guide: tag.guide_id.clone(),
            highlight_guide,
        });
    }

    if let Some(existing) =
        tag.links.iter_mut().find(|link| link.anchor.highlight_id() == Some(highlight_id))
    {
        return match comment {
            Some(comment) => {
                existing.comment = Some(comment);
                Ok(ActionOutcome::Updated)
            }
            None => Ok(ActionOutcome::Ignored),
        };
    }

    let id = new_id();
    tag.links.push(TagLink {
        id: id.clone(),
        created_at: now,
        comment,
        anchor: LinkAnchor::Highlight { highlight_id: highlight_id.to_owned(), page_number },
    });

    Ok(ActionOutcome::Created(id))
}

fn create_tag_pin(
    state: &mut ProjectState,
    guide_id: &str,
    tag_id: Option<TagId>,
    page_number: u32,
    position: NormalizedPoint,
    comment: Option<String>,
    now: Timestamp,
) -> ModelResult<ActionOutcome> {
    require_guide(state, guide_id)?;

    let tag_id = match tag_id {
        Some(tag_id) => tag_id,
        None => {
            let index = TagIndex::for_guide(state, guide_id);
            let (_, tag_id) = index.first_available().ok_or(ModelError::NoTagAvailable)?;
            tag_id.to_owned()
        }
    };

    if page_number == 0 || !position.is_finite() {
        return Ok(ActionOutcome::Ignored);
    }

    let tag = state.tag_mut(&tag_id).ok_or(ModelError::UnknownTag(tag_id))?;
    if tag.guide_id != guide_id {
        return Err(ModelError::GuideMismatch {
            tag_id: tag.id.clone(),
            tag_guide: tag.guide_id.clone(),
            highlight_guide: guide_id.to_owned(),
        });
    }

    let position = NormalizedPoint::new(position.x.clamp(0.0, 1.0), position.y.clamp(0.0, 1.0));
    let id = new_id();
    tag.links.push(TagLink {
        id: id.clone(),
        created_at: now,
        comment: comment.filter(|comment| !comment.trim().is_empty()),
        anchor: LinkAnchor::Pin { page_number, position },
    });

    Ok(ActionOutcome::Created(id))
}

fn find_link_mut<'a>(
    state: &'a mut ProjectState,
    tag_id: &str,
    link_id: &str,
) -> ModelResult<&'a mut TagLink> {
    let unknown_link =
        || ModelError::UnknownLink { tag_id: tag_id.to_owned(), link_id: link_id.to_owned() };

    state
        .tag_mut(tag_id)
        .ok_or_else(|| ModelError::UnknownTag(tag_id.to_owned()))?
        .links
        .iter_mut()
        .find(|link| link.id == link_id)
        .ok_or_else(unknown_link)
}

/// Stored sheet for `(guide, dimension)`, synthesized on first touch.
///
/// Only predefined dimensions are synthesized; emergent ones must already
/// exist because their ids are minted by `AddCustomDimension`.
fn sheet_entry<'a>(
    state: &'a mut ProjectState,
    guide_id: &str,
    dimension_id: &str,
) -> ModelResult<&'a mut AnalysisSheet> {
    require_guide(state, guide_id)?;

    let position =
        state.analysis_sheets.iter().position(|sheet| sheet.key() == (guide_id, dimension_id));

    let index = match position {
        Some(index) => index,
        None if find_dimension(dimension_id).is_some() => {
            state.analysis_sheets.push(AnalysisSheet::blank(guide_id, dimension_id));
            state.analysis_sheets.len() - 1
        }
        None => {
            return Err(ModelError::UnknownDimension {
                guide_id: guide_id.to_owned(),
                dimension_id: dimension_id.to_owned(),
            })
        }
    };

    Ok(&mut state.analysis_sheets[index])
}
