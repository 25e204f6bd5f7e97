use doc_model::{Highlight, NormalizedRect, ProjectState, PROJECT_STATE_VERSION};
use std::collections::HashSet;

/// Slack for rects whose far edge lands a rounding step past the page.
const PAGE_EPSILON: f64 = 1e-9;

/// Reasons an imported project document is refused.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("not a valid project document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported project version {found} (expected {PROJECT_STATE_VERSION})")]
    UnsupportedVersion { found: u32 },
    #[error("guide id {0} appears more than once")]
    DuplicateGuide(String),
    #[error("entities reference unknown guides: {}", .0.join(", "))]
    OrphanedReferences(Vec<String>),
    #[error("highlight {highlight_id} has invalid geometry: {reason}")]
    InvalidHighlight { highlight_id: String, reason: &'static str },
    #[error("tag {tag_id} links to unknown highlight {highlight_id}")]
    DanglingLink { tag_id: String, highlight_id: String },
}

/// Parse and validate an exported project document.
pub fn parse_project_state(json: &str) -> Result<ProjectState, ImportError> {
    let state: ProjectState = serde_json::from_str(json)?;
    validate(&state)?;
    Ok(state)
}

/// Check the invariants a loaded document must hold before it replaces the project.
pub fn validate(state: &ProjectState) -> Result<(), ImportError> {
    if state.version != PROJECT_STATE_VERSION {
        return Err(ImportError::UnsupportedVersion { found: state.version });
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = state.guides.iter().find(|guide| !seen.insert(guide.id.as_str())) {
        return Err(ImportError::DuplicateGuide(duplicate.id.clone()));
    }

    let orphans = state.orphaned_references();
    if !orphans.is_empty() {
        return Err(ImportError::OrphanedReferences(orphans));
    }

    for highlight in &state.highlights {
        check_highlight_geometry(highlight)?;
    }

    for tag in &state.tags {
        let dangling = tag
            .links
            .iter()
            .filter_map(|link| link.anchor.highlight_id())
            .find(|highlight_id| state.highlight(highlight_id).is_none());
        if let Some(highlight_id) = dangling {
            return Err(ImportError::DanglingLink {
                tag_id: tag.id.clone(),
                highlight_id: highlight_id.to_owned(),
            });
        }
    }

    Ok(())
}

fn check_highlight_geometry(highlight: &Highlight) -> Result<(), ImportError> {
    let invalid = |reason| ImportError::InvalidHighlight { highlight_id: highlight.id.clone(), reason };

    if highlight.rects.is_empty() {
        return Err(invalid("no rects"));
    }
    if !highlight.rects.iter().all(NormalizedRect::has_area) {
        return Err(invalid("rect without positive area"));
    }
    if !highlight.rects.iter().all(within_page) {
        return Err(invalid("rect outside the page"));
    }
    Ok(())
}

fn within_page(rect: &NormalizedRect) -> bool {
    rect.x >= -PAGE_EPSILON
        && rect.y >= -PAGE_EPSILON
        && rect.x + rect.width <= 1.0 + PAGE_EPSILON
        && rect.y + rect.height <= 1.0 + PAGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(guides: serde_json::Value, highlights: serde_json::Value) -> String {
        document_with_tags(guides, highlights, json!([]))
    }

    fn document_with_tags(
        guides: serde_json::Value,
        highlights: serde_json::Value,
        tags: serde_json::Value,
    ) -> String {
        json!({
            "version": 1,
            "createdAt": "2024-05-02T09:30:00Z",
            "updatedAt": "2024-05-02T09:30:00Z",
            "guides": guides,
            "highlights": highlights,
            "tags": tags,
            "drawings": [],
            "analysisSheets": []
        })
        .to_string()
    }

    fn guide(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Report",
            "status": "in_review",
            "sourceFileName": "report.pdf",
            "storageFileName": format!("{id}.bin"),
            "createdAt": "2024-05-02T09:30:00Z",
            "updatedAt": "2024-05-02T09:30:00Z"
        })
    }

    #[test]
    fn valid_document_is_accepted() {
        let state = parse_project_state(&document(json!([guide("g1")]), json!([]))).unwrap();
        assert_eq!(state.guides.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_project_state("{ nope"), Err(ImportError::Parse(_))));
        assert!(matches!(parse_project_state("{\"version\": 1}"), Err(ImportError::Parse(_))));
    }

    #[test]
    fn future_version_is_rejected() {
        let raw = document(json!([]), json!([])).replace("\"version\":1", "\"version\":2");
        assert!(matches!(
            parse_project_state(&raw),
            Err(ImportError::UnsupportedVersion { found: 2 })
        ));
    }

    #[test]
    fn duplicate_guides_are_rejected() {
        let raw = document(json!([guide("g1"), guide("g1")]), json!([]));
        assert!(matches!(parse_project_state(&raw), Err(ImportError::DuplicateGuide(id)) if id == "g1"));
    }

    fn highlight(guide_id: &str, rects: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "h1",
            "guideId": guide_id,
            "dimensionId": "dimension-1",
            "text": "x",
            "pageNumber": 1,
            "createdAt": "2024-05-02T09:30:00Z",
            "rects": rects
        })
    }

    fn unit_rect() -> serde_json::Value {
        json!([{ "x": 0.1, "y": 0.1, "width": 0.2, "height": 0.1 }])
    }

    #[test]
    fn orphaned_highlight_is_rejected() {
        let raw = document(json!([guide("g1")]), json!([highlight("missing", unit_rect())]));
        assert!(matches!(parse_project_state(&raw), Err(ImportError::OrphanedReferences(_))));
    }

    #[test]
    fn highlight_geometry_is_checked() {
        for rects in [
            json!([]),
            json!([{ "x": 0.1, "y": 0.1, "width": 0.0, "height": 0.1 }]),
            json!([{ "x": 0.1, "y": 0.1, "width": 0.2, "height": -0.1 }]),
            json!([{ "x": 0.9, "y": 0.1, "width": 0.5, "height": 0.1 }]),
            json!([{ "x": -0.2, "y": 0.1, "width": 0.5, "height": 0.1 }]),
        ] {
            let raw = document(json!([guide("g1")]), json!([highlight("g1", rects.clone())]));
            assert!(
                matches!(
                    parse_project_state(&raw),
                    Err(ImportError::InvalidHighlight { ref highlight_id, .. }) if highlight_id == "h1"
                ),
                "rects {rects} should be rejected"
            );
        }

        let edge = json!([{ "x": 0.0, "y": 0.0, "width": 1.0, "height": 1.0 }]);
        let raw = document(json!([guide("g1")]), json!([highlight("g1", edge)]));
        assert!(parse_project_state(&raw).is_ok());
    }

    #[test]
    fn link_to_missing_highlight_is_rejected() {
        let tag = |highlight_id: &str| {
            json!({
                "id": "t1",
                "guideId": "g1",
                "dimensionId": "dimension-1",
                "label": "Bias",
                "color": "#f59e0b",
                "createdAt": "2024-05-02T09:30:00Z",
                "links": [{
                    "id": "l1",
                    "createdAt": "2024-05-02T09:30:00Z",
                    "highlightId": highlight_id,
                    "pageNumber": 1
                }]
            })
        };
        let highlights = json!([highlight("g1", unit_rect())]);

        let raw = document_with_tags(json!([guide("g1")]), highlights.clone(), json!([tag("missing")]));
        assert!(matches!(
            parse_project_state(&raw),
            Err(ImportError::DanglingLink { tag_id, highlight_id }) if tag_id == "t1" && highlight_id == "missing"
        ));

        let raw = document_with_tags(json!([guide("g1")]), highlights, json!([tag("h1")]));
        assert!(parse_project_state(&raw).is_ok());
    }
}
