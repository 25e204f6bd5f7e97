//! Project state aggregate and its entities
//!
//! `ProjectState` owns every guide, highlight, tag, drawing and analysis sheet
//! of an opened project. Serialized field names are camelCase so the persisted
//! JSON document stays stable across storage backends.

use crate::geometry::{NormalizedPoint, NormalizedRect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written into every persisted project.
pub const PROJECT_STATE_VERSION: u32 = 1;

/// UTC instant, persisted as RFC 3339.
pub type Timestamp = DateTime<Utc>;

pub type GuideId = String;
pub type HighlightId = String;
pub type TagId = String;
pub type TagLinkId = String;
pub type DrawingId = String;
pub type DimensionId = String;

/// Mint a fresh random entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Review progress of one guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideStatus {
    #[default]
    NotStarted,
    InProgress,
    InReview,
    Completed,
}

impl GuideStatus {
    pub const ALL: [GuideStatus; 4] =
        [Self::NotStarted, Self::InProgress, Self::InReview, Self::Completed];

    /// Wire name, as written to the project file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Completed => "completed",
        }
    }

    /// Inverse of [`as_str`](Self::as_str).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// An uploaded source document under analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideDocument {
    pub id: GuideId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub status: GuideStatus,
    pub source_file_name: String,
    pub storage_file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A highlighted excerpt, anchored by one or more page-fraction rectangles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: HighlightId,
    pub guide_id: GuideId,
    pub dimension_id: DimensionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_id: Option<String>,
    pub text: String,
    pub page_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub rects: Vec<NormalizedRect>,
}

/// Where a tag link is anchored. Fixed for the lifetime of the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkAnchor {
    /// Attached to a highlight; the page is copied from it at attach time.
    Highlight {
        #[serde(rename = "highlightId")]
        highlight_id: HighlightId,
        #[serde(rename = "pageNumber")]
        page_number: u32,
    },
    /// Free-standing pin at a page-fraction position.
    Pin {
        #[serde(rename = "pageNumber")]
        page_number: u32,
        position: NormalizedPoint,
    },
}

impl LinkAnchor {
    /// 1-based page the link shows on.
    pub fn page_number(&self) -> u32 {
        match self {
            Self::Highlight { page_number, .. } | Self::Pin { page_number, .. } => *page_number,
        }
    }

    /// The anchoring highlight, or `None` for a pin.
    pub fn highlight_id(&self) -> Option<&str> {
        match self {
            Self::Highlight { highlight_id, .. } => Some(highlight_id),
            Self::Pin { .. } => None,
        }
    }
}

/// One use of a tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLink {
    pub id: TagLinkId,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub anchor: LinkAnchor,
}

/// A labeled category scoped to one dimension of one guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub guide_id: GuideId,
    pub dimension_id: DimensionId,
    pub label: String,
    pub color: String,
    #[serde(default)]
    pub links: Vec<TagLink>,
    pub created_at: Timestamp,
}

impl Tag {
    /// The link anchoring this tag to `highlight_id`.
    ///
    /// Attaching is idempotent, so there is at most one.
    pub fn link_for_highlight(&self, highlight_id: &str) -> Option<&TagLink> {
        self.links.iter().find(|link| link.anchor.highlight_id() == Some(highlight_id))
    }
}

/// A committed freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingAnnotation {
    pub id: DrawingId,
    pub guide_id: GuideId,
    pub page_number: u32,
    pub data: String,
    pub created_at: Timestamp,
}

/// Free-text analysis recorded against one dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSheetNotes {
    #[serde(default)]
    pub descriptive: String,
    #[serde(default)]
    pub quotations: String,
    #[serde(default)]
    pub interpretive: String,
    #[serde(default)]
    pub emergent_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl AnalysisSheetNotes {
    /// Add a code unless an equal one (after trimming) is already present.
    pub fn add_emergent_code(&mut self, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() || self.emergent_codes.iter().any(|existing| existing == code) {
            return false;
        }
        self.emergent_codes.push(code.to_owned());
        true
    }
}

/// Per-(guide, dimension) analysis notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSheet {
    pub guide_id: GuideId,
    pub dimension_id: DimensionId,
    #[serde(default)]
    pub notes: AnalysisSheetNotes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_custom_dimension: Option<bool>,
}

impl AnalysisSheet {
    /// Empty notes for a predefined dimension.
    pub fn blank(guide_id: &str, dimension_id: &str) -> Self {
        Self {
            guide_id: guide_id.to_owned(),
            dimension_id: dimension_id.to_owned(),
            notes: AnalysisSheetNotes::default(),
            custom_title: None,
            is_custom_dimension: None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom_dimension.unwrap_or(false)
    }

    /// `(guideId, dimensionId)`, unique within a project.
    pub fn key(&self) -> (&str, &str) {
        (&self.guide_id, &self.dimension_id)
    }
}

/// Root aggregate for one opened project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub version: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub guides: Vec<GuideDocument>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub drawings: Vec<DrawingAnnotation>,
    #[serde(default)]
    pub analysis_sheets: Vec<AnalysisSheet>,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::empty_at(Utc::now())
    }
}

impl ProjectState {
    /// A project with no entities, created and updated at `now`.
    pub fn empty_at(now: Timestamp) -> Self {
        Self {
            version: PROJECT_STATE_VERSION,
            created_at: now,
            updated_at: now,
            guides: Vec::new(),
            highlights: Vec::new(),
            tags: Vec::new(),
            drawings: Vec::new(),
            analysis_sheets: Vec::new(),
        }
    }

    pub fn guide(&self, guide_id: &str) -> Option<&GuideDocument> {
        self.guides.iter().find(|guide| guide.id == guide_id)
    }

    pub fn guide_mut(&mut self, guide_id: &str) -> Option<&mut GuideDocument> {
        self.guides.iter_mut().find(|guide| guide.id == guide_id)
    }

    pub fn has_guide(&self, guide_id: &str) -> bool {
        self.guide(guide_id).is_some()
    }

    pub fn highlight(&self, highlight_id: &str) -> Option<&Highlight> {
        self.highlights.iter().find(|highlight| highlight.id == highlight_id)
    }

    pub fn tag(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == tag_id)
    }

    pub fn tag_mut(&mut self, tag_id: &str) -> Option<&mut Tag> {
        self.tags.iter_mut().find(|tag| tag.id == tag_id)
    }

    pub fn sheet(&self, guide_id: &str, dimension_id: &str) -> Option<&AnalysisSheet> {
        self.analysis_sheets.iter().find(|sheet| sheet.key() == (guide_id, dimension_id))
    }

    /// Guide uploaded from the same bytes, if any.
    pub fn find_guide_by_fingerprint(&self, fingerprint: &str) -> Option<&GuideDocument> {
        self.guides.iter().find(|guide| guide.fingerprint.as_deref() == Some(fingerprint))
    }

    /// Ids of child entities whose `guideId` does not name a known guide.
    pub fn orphaned_references(&self) -> Vec<String> {
        let known = |guide_id: &str| self.has_guide(guide_id);

        self.highlights
            .iter()
            .filter(|h| !known(&h.guide_id))
            .map(|h| format!("highlight {}", h.id))
            .chain(self.tags.iter().filter(|t| !known(&t.guide_id)).map(|t| format!("tag {}", t.id)))
            .chain(
                self.drawings
                    .iter()
                    .filter(|d| !known(&d.guide_id))
                    .map(|d| format!("drawing {}", d.id)),
            )
            .chain(
                self.analysis_sheets
                    .iter()
                    .filter(|s| !known(&s.guide_id))
                    .map(|s| format!("sheet {}/{}", s.guide_id, s.dimension_id)),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_time() -> Timestamp {
        "2024-03-01T10:00:00Z".parse().expect("valid timestamp")
    }

    #[test]
    fn empty_state_uses_current_schema_version() {
        let state = ProjectState::empty_at(fixed_time());
        assert_eq!(state.version, PROJECT_STATE_VERSION);
        assert_eq!(state.created_at, state.updated_at);
        assert!(state.guides.is_empty());
    }

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(serde_json::to_value(GuideStatus::InReview).unwrap(), json!("in_review"));
        assert_eq!(GuideStatus::parse("not_started"), Some(GuideStatus::NotStarted));
        assert_eq!(GuideStatus::parse("archived"), None);
    }

    #[test]
    fn tag_link_anchors_serialize_flat() {
        let highlight_link = TagLink {
            id: "l1".to_owned(),
            created_at: fixed_time(),
            comment: Some("implicit framing".to_owned()),
            anchor: LinkAnchor::Highlight { highlight_id: "h1".to_owned(), page_number: 3 },
        };
        let value = serde_json::to_value(&highlight_link).unwrap();
        assert_eq!(value["highlightId"], json!("h1"));
        assert_eq!(value["pageNumber"], json!(3));
        assert!(value.get("position").is_none());

        let pin_link = TagLink {
            id: "l2".to_owned(),
            created_at: fixed_time(),
            comment: None,
            anchor: LinkAnchor::Pin { page_number: 2, position: NormalizedPoint::new(0.25, 0.5) },
        };
        let value = serde_json::to_value(&pin_link).unwrap();
        assert_eq!(value["position"], json!({ "x": 0.25, "y": 0.5 }));
        assert!(value.get("highlightId").is_none());
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn tag_link_anchor_kind_survives_reload() {
        let raw = json!({
            "id": "l2",
            "createdAt": "2024-03-01T10:00:00Z",
            "pageNumber": 4,
            "position": { "x": 0.1, "y": 0.9 }
        });
        let link: TagLink = serde_json::from_value(raw).unwrap();
        assert!(matches!(link.anchor, LinkAnchor::Pin { page_number: 4, .. }));

        let raw = json!({
            "id": "l3",
            "createdAt": "2024-03-01T10:00:00Z",
            "highlightId": "h9",
            "pageNumber": 1
        });
        let link: TagLink = serde_json::from_value(raw).unwrap();
        assert_eq!(link.anchor.highlight_id(), Some("h9"));
    }

    #[test]
    fn emergent_codes_behave_like_a_set() {
        let mut notes = AnalysisSheetNotes::default();
        assert!(notes.add_emergent_code(" surveillance "));
        assert!(!notes.add_emergent_code("surveillance"));
        assert!(!notes.add_emergent_code("   "));
        assert_eq!(notes.emergent_codes, vec!["surveillance".to_owned()]);
    }

    #[test]
    fn orphans_are_reported() {
        let mut state = ProjectState::empty_at(fixed_time());
        state.drawings.push(DrawingAnnotation {
            id: "d1".to_owned(),
            guide_id: "missing".to_owned(),
            page_number: 1,
            data: "M 0 0 L 1 1".to_owned(),
            created_at: fixed_time(),
        });
        assert_eq!(state.orphaned_references(), vec!["drawing d1".to_owned()]);
    }
}
