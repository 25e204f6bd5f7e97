//! Per-(guide, dimension) summary rows
//!
//! These rows are the shape shared by the JSON/CSV exports and the
//! comparative grid. They are derived views and never persisted.

use crate::project::{GuideDocument, GuideStatus, ProjectState};
use crate::query::{dimension_display_title, sheets_for_guide};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub guide_id: String,
    pub guide_title: String,
    pub institution: Option<String>,
    pub year: Option<String>,
    pub status: GuideStatus,
    pub dimension_id: String,
    pub dimension_title: String,
    pub is_custom_dimension: bool,
    pub descriptive: String,
    pub quotations: String,
    pub interpretive: String,
    pub emergent_codes: Vec<String>,
    pub memo: Option<String>,
    pub highlight_count: usize,
    pub tags: Vec<String>,
}

/// One guide's line in the comparative grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideSummary {
    pub guide_id: String,
    pub guide_title: String,
    pub status: GuideStatus,
    pub cells: Vec<SummaryRow>,
}

impl GuideSummary {
    /// Row for one dimension of this guide.
    pub fn cell(&self, dimension_id: &str) -> Option<&SummaryRow> {
        self.cells.iter().find(|row| row.dimension_id == dimension_id)
    }

    pub fn total_highlights(&self) -> usize {
        self.cells.iter().map(|row| row.highlight_count).sum()
    }
}

/// Rows for every guide, guides in project order, dimensions in sheet order.
pub fn summary_rows(state: &ProjectState) -> Vec<SummaryRow> {
    state.guides.iter().flat_map(|guide| rows_for_guide(state, guide)).collect()
}

/// Summary rows grouped by guide for side-by-side comparison.
pub fn comparative_grid(state: &ProjectState) -> Vec<GuideSummary> {
    state
        .guides
        .iter()
        .map(|guide| GuideSummary {
            guide_id: guide.id.clone(),
            guide_title: guide.title.clone(),
            status: guide.status,
            cells: rows_for_guide(state, guide),
        })
        .collect()
}

fn rows_for_guide(state: &ProjectState, guide: &GuideDocument) -> Vec<SummaryRow> {
    sheets_for_guide(state, &guide.id)
        .into_iter()
        .map(|sheet| {
            let highlight_count = state
                .highlights
                .iter()
                .filter(|h| h.guide_id == guide.id && h.dimension_id == sheet.dimension_id)
                .count();
            let tags = state
                .tags
                .iter()
                .filter(|t| t.guide_id == guide.id && t.dimension_id == sheet.dimension_id)
                .map(|t| t.label.clone())
                .collect();

            SummaryRow {
                guide_id: guide.id.clone(),
                guide_title: guide.title.clone(),
                institution: guide.institution.clone(),
                year: guide.year.clone(),
                status: guide.status,
                dimension_title: dimension_display_title(state, &guide.id, &sheet.dimension_id),
                is_custom_dimension: sheet.is_custom(),
                dimension_id: sheet.dimension_id,
                descriptive: sheet.notes.descriptive,
                quotations: sheet.notes.quotations,
                interpretive: sheet.notes.interpretive,
                emergent_codes: sheet.notes.emergent_codes,
                memo: sheet.notes.memo,
                highlight_count,
                tags,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{apply_project_action, NewHighlight, NoteField, ProjectAction};
    use crate::geometry::NormalizedRect;
    use crate::upload::{guide_from_upload, GuideUpload};

    #[test]
    fn rows_cover_every_dimension_and_count_highlights() {
        let now = "2024-05-02T09:30:00Z".parse().unwrap();
        let mut state = ProjectState::empty_at(now);
        let guide = guide_from_upload(&GuideUpload::new("report.pdf", b"a".to_vec()), now);
        let guide_id = guide.id.clone();

        let actions = vec![
            ProjectAction::AddGuide { guide },
            ProjectAction::CreateHighlight(NewHighlight {
                guide_id: guide_id.clone(),
                dimension_id: "dimension-5".to_owned(),
                indicator_id: None,
                text: "Risk assessment".to_owned(),
                page_number: 3,
                rects: vec![NormalizedRect::new(0.1, 0.1, 0.3, 0.05)],
                start_offset: None,
                end_offset: None,
                comment: None,
            }),
            ProjectAction::CreateTag {
                guide_id: guide_id.clone(),
                dimension_id: "dimension-5".to_owned(),
                label: "Privacy".to_owned(),
                color: None,
            },
            ProjectAction::UpdateSheetNotes {
                guide_id: guide_id.clone(),
                dimension_id: "dimension-5".to_owned(),
                field: NoteField::Memo,
                value: "follow up".to_owned(),
            },
        ];
        for action in actions {
            apply_project_action(&mut state, action, now).unwrap();
        }

        let rows = summary_rows(&state);
        assert_eq!(rows.len(), 7);

        let risks = rows.iter().find(|row| row.dimension_id == "dimension-5").unwrap();
        assert_eq!(risks.highlight_count, 1);
        assert_eq!(risks.tags, vec!["Privacy".to_owned()]);
        assert_eq!(risks.memo.as_deref(), Some("follow up"));
        assert_eq!(risks.dimension_title, "Risks, threats and concerns");

        let grid = comparative_grid(&state);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].total_highlights(), 1);
        assert_eq!(grid[0].cell("dimension-1").map(|c| c.highlight_count), Some(0));
    }
}
