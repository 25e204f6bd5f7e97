//! Predefined analysis dimensions
//!
//! The catalog is fixed and ordered. Researchers may rename a dimension on a
//! given guide (`AnalysisSheet::custom_title`) but its id never changes.

/// One entry in the predefined catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: Option<&'static str>,
}

/// Title shown for researcher-defined dimensions without a custom title.
pub const EMERGENT_DIMENSION_TITLE: &str = "Emergent dimension";

/// Prefix of ids minted for emergent dimensions.
pub const CUSTOM_DIMENSION_PREFIX: &str = "custom-";

pub const DEFAULT_DIMENSIONS: [DimensionDefinition; 7] = [
    DimensionDefinition {
        id: "dimension-1",
        title: "Document characterization",
        description: Some(
            "Basic contextual information about the author, format, institution and year.",
        ),
    },
    DimensionDefinition {
        id: "dimension-2",
        title: "Definition and conceptualization of AI in secondary education",
        description: Some(
            "How AI is defined and which theoretical or pedagogical framework is attached to it.",
        ),
    },
    DimensionDefinition {
        id: "dimension-3",
        title: "Representations of students and their practices",
        description: None,
    },
    DimensionDefinition {
        id: "dimension-4",
        title: "Representations and expectations of teachers",
        description: None,
    },
    DimensionDefinition {
        id: "dimension-5",
        title: "Risks, threats and concerns",
        description: None,
    },
    DimensionDefinition {
        id: "dimension-6",
        title: "Regulation, governance and accountability",
        description: None,
    },
    DimensionDefinition {
        id: "dimension-7",
        title: "Cross-cutting language, tone and discursive framing",
        description: None,
    },
];

pub fn find_dimension(id: &str) -> Option<&'static DimensionDefinition> {
    DEFAULT_DIMENSIONS.iter().find(|dimension| dimension.id == id)
}

pub fn is_predefined(id: &str) -> bool {
    find_dimension(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_seven_unique_ordered_ids() {
        let ids: Vec<_> = DEFAULT_DIMENSIONS.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), 7);
        for (index, id) in ids.iter().enumerate() {
            assert_eq!(*id, format!("dimension-{}", index + 1));
        }
    }

    #[test]
    fn lookup_distinguishes_custom_ids() {
        assert!(is_predefined("dimension-5"));
        assert!(!is_predefined("custom-1234"));
        assert_eq!(find_dimension("dimension-5").map(|d| d.title), Some("Risks, threats and concerns"));
    }
}
