pub mod actions;
pub mod dimensions;
pub mod error;
pub mod geometry;
pub mod project;
pub mod query;
pub mod summary;
pub mod upload;

pub use actions::{
    apply_project_action, replace_guide_sheets, ActionOutcome, GuidePatch, NewHighlight,
    NoteField, ProjectAction, DEFAULT_TAG_COLOR,
};
pub use dimensions::{
    find_dimension, is_predefined, DimensionDefinition, CUSTOM_DIMENSION_PREFIX,
    DEFAULT_DIMENSIONS, EMERGENT_DIMENSION_TITLE,
};
pub use error::{ModelError, ModelResult};
pub use geometry::{path_to_points, points_to_path, NormalizedPoint, NormalizedRect, PATH_SPACE};
pub use project::{
    new_id, AnalysisSheet, AnalysisSheetNotes, DimensionId, DrawingAnnotation, DrawingId,
    GuideDocument, GuideId, GuideStatus, Highlight, HighlightId, LinkAnchor, ProjectState, Tag,
    TagId, TagLink, TagLinkId, Timestamp, PROJECT_STATE_VERSION,
};
pub use query::{
    dimension_display_title, drawings_on_page, highlights_on_page, pins_on_page,
    sheets_for_guide, tags_for_highlight, TagIndex,
};
pub use summary::{comparative_grid, summary_rows, GuideSummary, SummaryRow};
pub use upload::{fingerprint, guide_from_upload, mime_type_for, GuideUpload};
