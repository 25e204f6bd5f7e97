//! Read-side views over `ProjectState`

use crate::dimensions::{find_dimension, DEFAULT_DIMENSIONS, EMERGENT_DIMENSION_TITLE};
use crate::project::{
    AnalysisSheet, DrawingAnnotation, Highlight, LinkAnchor, ProjectState, Tag, TagLink,
};

/// Tags of one guide grouped by dimension.
///
/// Groups are ordered by the predefined catalog, then by emergent dimensions
/// in the order their sheets were created, then by any remaining dimension in
/// tag creation order.
#[derive(Debug, Clone, Default)]
pub struct TagIndex<'a> {
    groups: Vec<(&'a str, Vec<&'a Tag>)>,
}

impl<'a> TagIndex<'a> {
    pub fn for_guide(state: &'a ProjectState, guide_id: &str) -> Self {
        let mut order: Vec<&'a str> = DEFAULT_DIMENSIONS.iter().map(|d| d.id).collect();
        for sheet in state.analysis_sheets.iter().filter(|s| s.guide_id == guide_id) {
            if !order.contains(&sheet.dimension_id.as_str()) {
                order.push(&sheet.dimension_id);
            }
        }
        for tag in state.tags.iter().filter(|t| t.guide_id == guide_id) {
            if !order.contains(&tag.dimension_id.as_str()) {
                order.push(&tag.dimension_id);
            }
        }

        let groups = order
            .into_iter()
            .map(|dimension_id| {
                let tags = state
                    .tags
                    .iter()
                    .filter(|t| t.guide_id == guide_id && t.dimension_id == dimension_id)
                    .collect::<Vec<_>>();
                (dimension_id, tags)
            })
            .filter(|(_, tags)| !tags.is_empty())
            .collect();

        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Tags of one dimension, in creation order.
    pub fn tags_for(&self, dimension_id: &str) -> &[&'a Tag] {
        self.groups
            .iter()
            .find(|(id, _)| *id == dimension_id)
            .map(|(_, tags)| tags.as_slice())
            .unwrap_or(&[])
    }

    /// First dimension with at least one tag, and that dimension's first tag.
    pub fn first_available(&self) -> Option<(&'a str, &'a str)> {
        self.groups
            .first()
            .and_then(|(dimension_id, tags)| {
                tags.first().copied().map(|tag| (*dimension_id, tag.id.as_str()))
            })
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(id, _)| *id)
    }
}

/// Every sheet a guide shows: the seven predefined ones in catalog order,
/// blank where nothing was stored yet, followed by stored emergent sheets.
pub fn sheets_for_guide(state: &ProjectState, guide_id: &str) -> Vec<AnalysisSheet> {
    let predefined = DEFAULT_DIMENSIONS.iter().map(|dimension| {
        state
            .sheet(guide_id, dimension.id)
            .cloned()
            .unwrap_or_else(|| AnalysisSheet::blank(guide_id, dimension.id))
    });

    let emergent = state
        .analysis_sheets
        .iter()
        .filter(|sheet| sheet.guide_id == guide_id && find_dimension(&sheet.dimension_id).is_none())
        .cloned();

    predefined.chain(emergent).collect()
}

/// Title shown for a dimension on a guide.
///
/// A custom title wins; emergent dimensions without one use the generic
/// emergent title; predefined ones fall back to the catalog title.
pub fn dimension_display_title(state: &ProjectState, guide_id: &str, dimension_id: &str) -> String {
    let sheet = state.sheet(guide_id, dimension_id);

    if let Some(title) = sheet.and_then(|sheet| sheet.custom_title.as_deref()) {
        if !title.trim().is_empty() {
            return title.to_owned();
        }
    }
    if sheet.is_some_and(AnalysisSheet::is_custom) {
        return EMERGENT_DIMENSION_TITLE.to_owned();
    }

    find_dimension(dimension_id)
        .map(|dimension| dimension.title.to_owned())
        .unwrap_or_else(|| dimension_id.to_owned())
}

/// Highlights of `guide_id` on `page_number`.
pub fn highlights_on_page<'a>(
    state: &'a ProjectState,
    guide_id: &'a str,
    page_number: u32,
) -> impl Iterator<Item = &'a Highlight> + 'a {
    state
        .highlights
        .iter()
        .filter(move |h| h.guide_id == guide_id && h.page_number == page_number)
}

/// Drawings of `guide_id` on `page_number`.
pub fn drawings_on_page<'a>(
    state: &'a ProjectState,
    guide_id: &'a str,
    page_number: u32,
) -> impl Iterator<Item = &'a DrawingAnnotation> + 'a {
    state
        .drawings
        .iter()
        .filter(move |d| d.guide_id == guide_id && d.page_number == page_number)
}

/// Free-floating pins on one page, paired with their tag.
pub fn pins_on_page<'a>(
    state: &'a ProjectState,
    guide_id: &'a str,
    page_number: u32,
) -> impl Iterator<Item = (&'a Tag, &'a TagLink)> + 'a {
    state
        .tags
        .iter()
        .filter(move |tag| tag.guide_id == guide_id)
        .flat_map(|tag| tag.links.iter().map(move |link| (tag, link)))
        .filter(move |(_, link)| {
            matches!(link.anchor, LinkAnchor::Pin { page_number: page, .. } if page == page_number)
        })
}

/// Tags attached to a highlight, in tag creation order.
pub fn tags_for_highlight<'a>(
    state: &'a ProjectState,
    highlight_id: &'a str,
) -> impl Iterator<Item = (&'a Tag, &'a TagLink)> + 'a {
    state
        .tags
        .iter()
        .filter_map(move |tag| tag.link_for_highlight(highlight_id).map(|link| (tag, link)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Timestamp;

    fn now() -> Timestamp {
        "2024-05-02T09:30:00Z".parse().unwrap()
    }

    fn tag(id: &str, guide_id: &str, dimension_id: &str) -> Tag {
        Tag {
            id: id.to_owned(),
            guide_id: guide_id.to_owned(),
            dimension_id: dimension_id.to_owned(),
            label: id.to_uppercase(),
            color: "#000000".to_owned(),
            links: Vec::new(),
            created_at: now(),
        }
    }

    #[test]
    fn first_available_follows_catalog_order() {
        let mut state = ProjectState::empty_at(now());
        state.tags.push(tag("late", "g1", "dimension-6"));
        state.tags.push(tag("early", "g1", "dimension-2"));
        state.tags.push(tag("other-guide", "g2", "dimension-1"));

        let index = TagIndex::for_guide(&state, "g1");
        assert_eq!(index.first_available(), Some(("dimension-2", "early")));
        assert_eq!(index.dimensions().collect::<Vec<_>>(), vec!["dimension-2", "dimension-6"]);
        assert!(index.tags_for("dimension-1").is_empty());
    }

    #[test]
    fn empty_index_has_no_available_tag() {
        let state = ProjectState::empty_at(now());
        let index = TagIndex::for_guide(&state, "g1");
        assert!(index.is_empty());
        assert_eq!(index.first_available(), None);
    }

    #[test]
    fn sheets_are_synthesized_for_predefined_dimensions() {
        let mut state = ProjectState::empty_at(now());
        let mut stored = AnalysisSheet::blank("g1", "dimension-3");
        stored.notes.descriptive = "students as users".to_owned();
        state.analysis_sheets.push(stored);
        state.analysis_sheets.push(AnalysisSheet {
            custom_title: Some("Equity".to_owned()),
            is_custom_dimension: Some(true),
            ..AnalysisSheet::blank("g1", "custom-abc")
        });

        let sheets = sheets_for_guide(&state, "g1");
        assert_eq!(sheets.len(), 8);
        assert_eq!(sheets[0].dimension_id, "dimension-1");
        assert_eq!(sheets[2].notes.descriptive, "students as users");
        assert_eq!(sheets[7].dimension_id, "custom-abc");
    }

    #[test]
    fn display_title_precedence() {
        let mut state = ProjectState::empty_at(now());
        state.analysis_sheets.push(AnalysisSheet {
            is_custom_dimension: Some(true),
            ..AnalysisSheet::blank("g1", "custom-1")
        });
        state.analysis_sheets.push(AnalysisSheet {
            custom_title: Some("Learners".to_owned()),
            ..AnalysisSheet::blank("g1", "dimension-3")
        });

        assert_eq!(dimension_display_title(&state, "g1", "custom-1"), EMERGENT_DIMENSION_TITLE);
        assert_eq!(dimension_display_title(&state, "g1", "dimension-3"), "Learners");
        assert_eq!(
            dimension_display_title(&state, "g1", "dimension-5"),
            "Risks, threats and concerns"
        );
        assert_eq!(dimension_display_title(&state, "g1", "mystery"), "mystery");
    }
}
