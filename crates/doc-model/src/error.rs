/// Reasons a project action was rejected.
///
/// None of these leave the state partially mutated: actions validate before
/// touching the project.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("no tag is available to place; create a tag for a dimension first")]
    NoTagAvailable,

    #[error("unknown guide: {0}")]
    UnknownGuide(String),

    #[error("unknown highlight: {0}")]
    UnknownHighlight(String),

    #[error("unknown tag: {0}")]
    UnknownTag(String),

    #[error("unknown tag link {link_id} on tag {tag_id}")]
    UnknownLink { tag_id: String, link_id: String },

    #[error("unknown dimension {dimension_id} on guide {guide_id}")]
    UnknownDimension { guide_id: String, dimension_id: String },

    #[error("unknown drawing: {0}")]
    UnknownDrawing(String),

    #[error("tag {tag_id} belongs to guide {tag_guide}, not {highlight_guide}")]
    GuideMismatch { tag_id: String, tag_guide: String, highlight_guide: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
