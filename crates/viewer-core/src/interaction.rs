//! Gesture capture over a rendered page surface
//!
//! Selection, freehand drawing and pin placement are mutually exclusive: the
//! active mode is a single `InteractionState` value, and every transition
//! goes through `InteractionMachine`. Gestures that cannot be resolved to a
//! page (no page under the pointer, collapsed selection, unusable page
//! bounds) fall back to `Idle` without an error.

use crate::normalize::{normalize_point, normalize_rects, PixelPoint, PixelRect};
use crate::surface::PageSurface;
use doc_model::{
    DimensionId, HighlightId, ModelError, NewHighlight, NormalizedPoint, NormalizedRect,
    ProjectAction, ProjectState, TagId, TagIndex, TagLinkId,
};
use tracing::debug;

/// Native text selection as reported by the surface when the user releases it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCapture {
    pub text: String,
    pub page_number: Option<u32>,
    pub client_rects: Vec<PixelRect>,
    pub start_offset: Option<u32>,
    pub end_offset: Option<u32>,
}

/// Selection resolved against its page, waiting for a dimension choice.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    pub page_number: u32,
    pub text: String,
    pub rects: Vec<NormalizedRect>,
    pub start_offset: Option<u32>,
    pub end_offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub page_number: u32,
    pub points: Vec<NormalizedPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagPopover {
    /// Viewing or editing an existing link.
    View { tag_id: TagId, link_id: TagLinkId },
    /// Choosing a tag for an existing highlight.
    AttachToHighlight { highlight_id: HighlightId, dimension_id: Option<DimensionId>, tag_id: Option<TagId> },
    /// Confirming a new free-floating pin.
    CreatePin { page_number: u32, position: NormalizedPoint, dimension_id: DimensionId, tag_id: TagId },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    SelectionPending(PendingSelection),
    /// Drawing mode is armed; `stroke` is set while the pointer is down.
    Drawing { stroke: Option<Stroke> },
    PlacingTag,
    TagPopoverOpen(TagPopover),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagAttachment {
    pub tag_id: TagId,
    pub comment: Option<String>,
}

/// A creation or update request produced by a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionIntent {
    CreateHighlight {
        selection: PendingSelection,
        dimension_id: DimensionId,
        indicator_id: Option<String>,
        comment: Option<String>,
        attach: Option<TagAttachment>,
    },
    AddDrawing(Stroke),
    CreateTagPin { tag_id: TagId, page_number: u32, position: NormalizedPoint, comment: Option<String> },
    AttachTag { tag_id: TagId, highlight_id: HighlightId, comment: Option<String> },
    UpdateTagLinkComment { tag_id: TagId, link_id: TagLinkId, comment: String },
    RemoveTagLink { tag_id: TagId, link_id: TagLinkId },
}

impl InteractionIntent {
    /// Project action for this intent on `guide_id`.
    ///
    /// A highlight with a chained tag attach is returned as the highlight
    /// action only; the caller attaches once the highlight id is known.
    pub fn to_action(&self, guide_id: &str) -> ProjectAction {
        match self.clone() {
            Self::CreateHighlight { selection, dimension_id, indicator_id, comment, .. } => {
                ProjectAction::CreateHighlight(NewHighlight {
                    guide_id: guide_id.to_owned(),
                    dimension_id,
                    indicator_id,
                    text: selection.text,
                    page_number: selection.page_number,
                    rects: selection.rects,
                    start_offset: selection.start_offset,
                    end_offset: selection.end_offset,
                    comment,
                })
            }
            Self::AddDrawing(stroke) => ProjectAction::AddDrawing {
                guide_id: guide_id.to_owned(),
                page_number: stroke.page_number,
                points: stroke.points,
            },
            Self::CreateTagPin { tag_id, page_number, position, comment } => {
                ProjectAction::CreateTagPin {
                    guide_id: guide_id.to_owned(),
                    tag_id: Some(tag_id),
                    page_number,
                    position,
                    comment,
                }
            }
            Self::AttachTag { tag_id, highlight_id, comment } => {
                ProjectAction::AttachTag { tag_id, highlight_id, comment }
            }
            Self::UpdateTagLinkComment { tag_id, link_id, comment } => {
                ProjectAction::UpdateTagLinkComment { tag_id, link_id, comment }
            }
            Self::RemoveTagLink { tag_id, link_id } => ProjectAction::RemoveTagLink { tag_id, link_id },
        }
    }

    pub fn chained_attachment(&self) -> Option<&TagAttachment> {
        match self {
            Self::CreateHighlight { attach, .. } => attach.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionOutput {
    pub intents: Vec<InteractionIntent>,
    /// The surface should drop its native text selection.
    pub clear_native_selection: bool,
}

impl InteractionOutput {
    fn none() -> Self {
        Self::default()
    }

    fn intent(intent: InteractionIntent) -> Self {
        Self { intents: vec![intent], clear_native_selection: false }
    }

    fn clear_selection() -> Self {
        Self { intents: Vec::new(), clear_native_selection: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_drawing_armed(&self) -> bool {
        matches!(self.state, InteractionState::Drawing { .. })
    }

    pub fn is_placing_tag(&self) -> bool {
        matches!(self.state, InteractionState::PlacingTag)
    }

    /// Back to `Idle`, dropping any stroke or selection in progress.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn enter_drawing(&mut self) -> InteractionOutput {
        self.state = InteractionState::Drawing { stroke: None };
        InteractionOutput::clear_selection()
    }

    /// Turn drawing mode off, committing a stroke that is still in progress.
    pub fn exit_drawing(&mut self) -> InteractionOutput {
        let output = match std::mem::take(&mut self.state) {
            InteractionState::Drawing { stroke: Some(stroke) } => commit_stroke(stroke),
            InteractionState::Drawing { stroke: None } => InteractionOutput::none(),
            other => {
                self.state = other;
                return InteractionOutput::none();
            }
        };
        self.state = InteractionState::Idle;
        output
    }

    pub fn enter_placing_tag(&mut self) -> InteractionOutput {
        self.state = InteractionState::PlacingTag;
        InteractionOutput::clear_selection()
    }

    pub fn cancel(&mut self) -> InteractionOutput {
        let clear = matches!(self.state, InteractionState::SelectionPending(_));
        self.state = InteractionState::Idle;
        InteractionOutput { intents: Vec::new(), clear_native_selection: clear }
    }

    /// The user released a text selection.
    ///
    /// Ignored while drawing or placing a pin. A selection that does not
    /// resolve to trimmed text and at least one positive-area rect on a
    /// known page leaves the machine `Idle`.
    pub fn selection_completed(
        &mut self,
        surface: &dyn PageSurface,
        capture: SelectionCapture,
    ) -> InteractionOutput {
        match self.state {
            InteractionState::Idle | InteractionState::SelectionPending(_) => {}
            _ => return InteractionOutput::none(),
        }

        match resolve_selection(surface, capture) {
            Some(selection) => self.state = InteractionState::SelectionPending(selection),
            None => self.state = InteractionState::Idle,
        }
        InteractionOutput::none()
    }

    /// Confirm the pending selection against a dimension.
    pub fn confirm_selection(
        &mut self,
        dimension_id: impl Into<DimensionId>,
        comment: Option<String>,
        attach: Option<TagAttachment>,
    ) -> InteractionOutput {
        let selection = match std::mem::take(&mut self.state) {
            InteractionState::SelectionPending(selection) => selection,
            other => {
                self.state = other;
                return InteractionOutput::none();
            }
        };

        InteractionOutput {
            intents: vec![InteractionIntent::CreateHighlight {
                selection,
                dimension_id: dimension_id.into(),
                indicator_id: None,
                comment,
                attach,
            }],
            clear_native_selection: true,
        }
    }

    /// Start a stroke while drawing is armed.
    ///
    /// A stroke still in progress (its pointer up never arrived) is
    /// committed first under the usual two-point rule.
    pub fn pointer_down(&mut self, surface: &dyn PageSurface, point: PixelPoint) -> InteractionOutput {
        let InteractionState::Drawing { stroke } = &mut self.state else {
            return InteractionOutput::none();
        };

        let output = match stroke.take() {
            Some(unfinished) => commit_stroke(unfinished),
            None => InteractionOutput::none(),
        };

        match resolve_point(surface, point) {
            Some((page_number, position)) => {
                *stroke = Some(Stroke { page_number, points: vec![position] });
            }
            None => debug!(x = point.x, y = point.y, "pointer down outside any page"),
        }
        output
    }

    /// Extend the active stroke. Points over other pages are ignored.
    pub fn pointer_move(&mut self, surface: &dyn PageSurface, point: PixelPoint) -> InteractionOutput {
        let InteractionState::Drawing { stroke: Some(stroke) } = &mut self.state else {
            return InteractionOutput::none();
        };

        let position = surface
            .page_bounds(stroke.page_number)
            .filter(|bounds| bounds.contains(point))
            .and_then(|bounds| normalize_point(&bounds, point));
        if let Some(position) = position {
            stroke.points.push(position);
        }
        InteractionOutput::none()
    }

    /// Pointer up, leave and cancel all end the stroke the same way.
    pub fn pointer_up(&mut self) -> InteractionOutput {
        let InteractionState::Drawing { stroke } = &mut self.state else {
            return InteractionOutput::none();
        };

        match stroke.take() {
            Some(stroke) => commit_stroke(stroke),
            None => InteractionOutput::none(),
        }
    }

    /// Click while a pin is armed.
    ///
    /// Placement is disarmed whatever the outcome. Fails with
    /// `NoTagAvailable` when the guide has no tag in any dimension.
    pub fn page_click(
        &mut self,
        surface: &dyn PageSurface,
        point: PixelPoint,
        tags: &TagIndex<'_>,
    ) -> Result<InteractionOutput, ModelError> {
        if !self.is_placing_tag() {
            return Ok(InteractionOutput::none());
        }
        self.state = InteractionState::Idle;

        let Some((page_number, position)) = resolve_point(surface, point) else {
            debug!(x = point.x, y = point.y, "pin click outside any page");
            return Ok(InteractionOutput::none());
        };

        let (dimension_id, tag_id) = tags.first_available().ok_or(ModelError::NoTagAvailable)?;
        self.state = InteractionState::TagPopoverOpen(TagPopover::CreatePin {
            page_number,
            position,
            dimension_id: dimension_id.to_owned(),
            tag_id: tag_id.to_owned(),
        });
        Ok(InteractionOutput::none())
    }

    pub fn open_link(&mut self, tag_id: impl Into<TagId>, link_id: impl Into<TagLinkId>) {
        self.state = InteractionState::TagPopoverOpen(TagPopover::View {
            tag_id: tag_id.into(),
            link_id: link_id.into(),
        });
    }

    pub fn open_attach(&mut self, highlight_id: impl Into<HighlightId>) {
        self.state = InteractionState::TagPopoverOpen(TagPopover::AttachToHighlight {
            highlight_id: highlight_id.into(),
            dimension_id: None,
            tag_id: None,
        });
    }

    /// Pick the tag an open attach or pin popover will use.
    pub fn choose_tag(&mut self, dimension: impl Into<DimensionId>, tag: impl Into<TagId>) {
        match &mut self.state {
            InteractionState::TagPopoverOpen(TagPopover::AttachToHighlight {
                dimension_id,
                tag_id,
                ..
            }) => {
                *dimension_id = Some(dimension.into());
                *tag_id = Some(tag.into());
            }
            InteractionState::TagPopoverOpen(TagPopover::CreatePin { dimension_id, tag_id, .. }) => {
                *dimension_id = dimension.into();
                *tag_id = tag.into();
            }
            _ => {}
        }
    }

    /// Confirm the open popover with the comment typed into it.
    pub fn confirm_popover(&mut self, comment: Option<String>) -> InteractionOutput {
        let popover = match std::mem::take(&mut self.state) {
            InteractionState::TagPopoverOpen(popover) => popover,
            other => {
                self.state = other;
                return InteractionOutput::none();
            }
        };

        match popover {
            TagPopover::View { tag_id, link_id } => match comment {
                Some(comment) => InteractionOutput::intent(InteractionIntent::UpdateTagLinkComment {
                    tag_id,
                    link_id,
                    comment,
                }),
                None => InteractionOutput::none(),
            },
            TagPopover::AttachToHighlight { highlight_id, tag_id: Some(tag_id), .. } => {
                InteractionOutput::intent(InteractionIntent::AttachTag { tag_id, highlight_id, comment })
            }
            TagPopover::AttachToHighlight { tag_id: None, .. } => InteractionOutput::none(),
            TagPopover::CreatePin { page_number, position, tag_id, .. } => {
                InteractionOutput::intent(InteractionIntent::CreateTagPin {
                    tag_id,
                    page_number,
                    position,
                    comment,
                })
            }
        }
    }

    /// Unlink the tag shown in a `View` popover.
    pub fn remove_open_link(&mut self) -> InteractionOutput {
        match std::mem::take(&mut self.state) {
            InteractionState::TagPopoverOpen(TagPopover::View { tag_id, link_id }) => {
                InteractionOutput::intent(InteractionIntent::RemoveTagLink { tag_id, link_id })
            }
            other => {
                self.state = other;
                InteractionOutput::none()
            }
        }
    }

    pub fn dismiss_popover(&mut self) {
        if matches!(self.state, InteractionState::TagPopoverOpen(_)) {
            self.state = InteractionState::Idle;
        }
    }

    /// Close a popover whose tag, link or highlight no longer exists.
    pub fn reconcile(&mut self, project: &ProjectState) {
        let InteractionState::TagPopoverOpen(popover) = &self.state else {
            return;
        };

        let still_valid = match popover {
            TagPopover::View { tag_id, link_id } => project
                .tag(tag_id)
                .is_some_and(|tag| tag.links.iter().any(|link| &link.id == link_id)),
            TagPopover::AttachToHighlight { highlight_id, tag_id, .. } => {
                project.highlight(highlight_id).is_some()
                    && tag_id.as_ref().map_or(true, |tag_id| project.tag(tag_id).is_some())
            }
            TagPopover::CreatePin { tag_id, .. } => project.tag(tag_id).is_some(),
        };

        if !still_valid {
            debug!("closing popover for a removed entity");
            self.state = InteractionState::Idle;
        }
    }
}

fn commit_stroke(stroke: Stroke) -> InteractionOutput {
    if stroke.points.len() > 1 {
        InteractionOutput::intent(InteractionIntent::AddDrawing(stroke))
    } else {
        InteractionOutput::none()
    }
}

fn resolve_point(surface: &dyn PageSurface, point: PixelPoint) -> Option<(u32, NormalizedPoint)> {
    let page_number = surface.page_at(point)?;
    let bounds = surface.page_bounds(page_number)?;
    normalize_point(&bounds, point).map(|position| (page_number, position))
}

fn resolve_selection(surface: &dyn PageSurface, capture: SelectionCapture) -> Option<PendingSelection> {
    if let Some(error) = surface.load_error() {
        debug!(%error, "selection on a document that failed to load");
        return None;
    }

    let text = capture.text.trim();
    if text.is_empty() {
        return None;
    }

    let page_number = capture.page_number.filter(|page| (1..=surface.page_count()).contains(page))?;
    let bounds = surface.page_bounds(page_number)?;
    let rects = normalize_rects(&bounds, &capture.client_rects);
    if rects.is_empty() {
        debug!(page_number, "selection produced no usable rects");
        return None;
    }

    Some(PendingSelection {
        page_number,
        text: text.to_owned(),
        rects,
        start_offset: capture.start_offset,
        end_offset: capture.end_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::UniformPageSurface;
    use doc_model::Tag;

    fn surface() -> UniformPageSurface {
        UniformPageSurface::new(5, 600.0, 800.0)
    }

    fn selection_on_page(page: u32, text: &str, rects: Vec<PixelRect>) -> SelectionCapture {
        SelectionCapture {
            text: text.to_owned(),
            page_number: Some(page),
            client_rects: rects,
            start_offset: None,
            end_offset: None,
        }
    }

    fn tag(id: &str, dimension_id: &str) -> Tag {
        Tag {
            id: id.to_owned(),
            guide_id: "g1".to_owned(),
            dimension_id: dimension_id.to_owned(),
            label: id.to_owned(),
            color: "#0ea5e9".to_owned(),
            links: Vec::new(),
            created_at: "2024-05-02T09:30:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn selection_on_page_three_creates_highlight_intent() {
        let surface = surface();
        let top = surface.page_bounds(3).unwrap().top;
        let mut machine = InteractionMachine::new();

        machine.selection_completed(
            &surface,
            selection_on_page(
                3,
                " Risk assessment ",
                vec![PixelRect::new(60.0, top + 80.0, 300.0, 16.0)],
            ),
        );
        assert!(matches!(machine.state(), InteractionState::SelectionPending(_)));

        let output = machine.confirm_selection("dimension-5", None, None);
        assert!(output.clear_native_selection);
        assert_eq!(machine.state(), &InteractionState::Idle);

        let [InteractionIntent::CreateHighlight { selection, dimension_id, .. }] =
            output.intents.as_slice()
        else {
            panic!("expected one highlight intent, got {:?}", output.intents);
        };
        assert_eq!(selection.page_number, 3);
        assert_eq!(selection.text, "Risk assessment");
        assert_eq!(dimension_id, "dimension-5");
        assert!((selection.rects[0].x - 0.1).abs() < 1e-9);
        assert!((selection.rects[0].y - 0.1).abs() < 1e-9);
    }

    #[test]
    fn collapsed_or_unresolved_selection_stays_idle() {
        let surface = surface();
        let mut machine = InteractionMachine::new();

        machine.selection_completed(
            &surface,
            selection_on_page(1, "   ", vec![PixelRect::new(0.0, 0.0, 10.0, 10.0)]),
        );
        assert_eq!(machine.state(), &InteractionState::Idle);

        machine.selection_completed(
            &surface,
            selection_on_page(1, "text", vec![PixelRect::new(0.0, 0.0, 0.0, 10.0)]),
        );
        assert_eq!(machine.state(), &InteractionState::Idle);

        machine.selection_completed(
            &surface,
            selection_on_page(9, "text", vec![PixelRect::new(0.0, 0.0, 10.0, 10.0)]),
        );
        assert_eq!(machine.state(), &InteractionState::Idle);

        let output = machine.confirm_selection("dimension-1", None, None);
        assert!(output.intents.is_empty());
    }

    #[test]
    fn entering_drawing_drops_pending_selection() {
        let surface = surface();
        let mut machine = InteractionMachine::new();
        machine.selection_completed(
            &surface,
            selection_on_page(1, "text", vec![PixelRect::new(0.0, 0.0, 10.0, 10.0)]),
        );

        let output = machine.enter_drawing();
        assert!(output.clear_native_selection);
        assert_eq!(machine.state(), &InteractionState::Drawing { stroke: None });

        machine.selection_completed(
            &surface,
            selection_on_page(1, "later", vec![PixelRect::new(0.0, 0.0, 10.0, 10.0)]),
        );
        assert!(machine.is_drawing_armed());
    }

    #[test]
    fn tap_is_discarded_and_drag_is_committed() {
        let surface = surface();
        let mut machine = InteractionMachine::new();
        machine.enter_drawing();

        machine.pointer_down(&surface, PixelPoint::new(300.0, 400.0));
        assert!(machine.pointer_up().intents.is_empty());
        assert_eq!(machine.state(), &InteractionState::Drawing { stroke: None });

        machine.pointer_down(&surface, PixelPoint::new(300.0, 400.0));
        machine.pointer_move(&surface, PixelPoint::new(330.0, 420.0));
        machine.pointer_move(&surface, PixelPoint::new(300.0, 900.0));
        let output = machine.pointer_up();

        let [InteractionIntent::AddDrawing(stroke)] = output.intents.as_slice() else {
            panic!("expected a drawing intent");
        };
        assert_eq!(stroke.page_number, 1);
        assert_eq!(stroke.points.len(), 2);
        assert!(machine.is_drawing_armed());
    }

    #[test]
    fn exiting_drawing_commits_open_stroke() {
        let surface = surface();
        let mut machine = InteractionMachine::new();
        machine.enter_drawing();
        machine.pointer_down(&surface, PixelPoint::new(10.0, 10.0));
        machine.pointer_move(&surface, PixelPoint::new(20.0, 20.0));

        let output = machine.exit_drawing();
        assert_eq!(output.intents.len(), 1);
        assert_eq!(machine.state(), &InteractionState::Idle);
    }

    #[test]
    fn second_pointer_down_commits_unfinished_stroke() {
        let surface = surface();
        let mut machine = InteractionMachine::new();
        machine.enter_drawing();

        machine.pointer_down(&surface, PixelPoint::new(10.0, 10.0));
        machine.pointer_move(&surface, PixelPoint::new(40.0, 40.0));
        let output = machine.pointer_down(&surface, PixelPoint::new(200.0, 200.0));

        let [InteractionIntent::AddDrawing(first)] = output.intents.as_slice() else {
            panic!("expected the unfinished stroke to be committed");
        };
        assert_eq!(first.points.len(), 2);
        assert!(matches!(
            machine.state(),
            InteractionState::Drawing { stroke: Some(stroke) } if stroke.points.len() == 1
        ));

        let output = machine.pointer_down(&surface, PixelPoint::new(250.0, 250.0));
        assert!(output.intents.is_empty());
    }

    #[test]
    fn pin_click_without_tags_fails_and_disarms() {
        let surface = surface();
        let project = ProjectState::empty_at("2024-05-02T09:30:00Z".parse().unwrap());
        let tags = TagIndex::for_guide(&project, "g1");
        let mut machine = InteractionMachine::new();
        machine.enter_placing_tag();

        let result = machine.page_click(&surface, PixelPoint::new(100.0, 100.0), &tags);
        assert_eq!(result, Err(ModelError::NoTagAvailable));
        assert_eq!(machine.state(), &InteractionState::Idle);
    }

    #[test]
    fn pin_click_seeds_first_tagged_dimension() {
        let surface = surface();
        let mut project = ProjectState::empty_at("2024-05-02T09:30:00Z".parse().unwrap());
        project.tags.push(tag("t-late", "dimension-7"));
        project.tags.push(tag("t-early", "dimension-3"));
        let tags = TagIndex::for_guide(&project, "g1");
        let mut machine = InteractionMachine::new();
        machine.enter_placing_tag();

        machine.page_click(&surface, PixelPoint::new(300.0, 200.0), &tags).unwrap();
        let InteractionState::TagPopoverOpen(TagPopover::CreatePin { dimension_id, tag_id, page_number, .. }) =
            machine.state().clone()
        else {
            panic!("expected pin popover");
        };
        assert_eq!(dimension_id, "dimension-3");
        assert_eq!(tag_id, "t-early");
        assert_eq!(page_number, 1);

        let output = machine.confirm_popover(Some("note".to_owned()));
        assert!(matches!(output.intents[0], InteractionIntent::CreateTagPin { .. }));
        assert_eq!(machine.state(), &InteractionState::Idle);
    }

    #[test]
    fn popover_closes_when_link_disappears() {
        let mut project = ProjectState::empty_at("2024-05-02T09:30:00Z".parse().unwrap());
        project.tags.push(tag("t1", "dimension-1"));
        let mut machine = InteractionMachine::new();

        machine.open_link("t1", "missing-link");
        machine.reconcile(&project);
        assert_eq!(machine.state(), &InteractionState::Idle);
    }

    #[test]
    fn intent_maps_to_project_action() {
        let intent = InteractionIntent::AddDrawing(Stroke {
            page_number: 2,
            points: vec![NormalizedPoint::new(0.1, 0.1), NormalizedPoint::new(0.2, 0.2)],
        });
        let ProjectAction::AddDrawing { guide_id, page_number, points } = intent.to_action("g1") else {
            panic!("expected drawing action");
        };
        assert_eq!(guide_id, "g1");
        assert_eq!(page_number, 2);
        assert_eq!(points.len(), 2);
    }
}
