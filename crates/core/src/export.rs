//! Summary exports
//!
//! Both formats carry the same rows: one per (guide, dimension), in
//! project order. CSV uses `;` as delimiter and quotes every field.

use doc_model::{summary_rows, ProjectState, SummaryRow};
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

pub const CSV_DELIMITER: u8 = b';';
pub const MULTI_VALUE_SEPARATOR: &str = ", ";

pub const CSV_HEADERS: [&str; 15] = [
    "guideId",
    "guideTitle",
    "institution",
    "year",
    "status",
    "dimensionId",
    "dimensionTitle",
    "isCustomDimension",
    "descriptive",
    "quotations",
    "interpretive",
    "emergentCodes",
    "memo",
    "highlightCount",
    "tags",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Render the summary rows of `state` in `format`.
pub fn export(state: &ProjectState, format: ExportFormat) -> ExportResult<String> {
    match format {
        ExportFormat::Json => export_json(state),
        ExportFormat::Csv => export_csv(state),
    }
}

/// Pretty-printed JSON array of summary rows.
pub fn export_json(state: &ProjectState) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(&summary_rows(state))?)
}

/// Summary rows as semicolon-separated CSV with a header line.
pub fn export_csv(state: &ProjectState) -> ExportResult<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, &summary_rows(state))?;
    // Every field comes from a `String`, so the output is valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn write_csv<W: Write>(writer: W, rows: &[SummaryRow]) -> ExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .quote_style(csv::QuoteStyle::Always)
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADERS)?;

    for row in rows {
        csv_writer.write_record([
            row.guide_id.clone(),
            row.guide_title.clone(),
            row.institution.clone().unwrap_or_default(),
            row.year.clone().unwrap_or_default(),
            row.status.as_str().to_owned(),
            row.dimension_id.clone(),
            row.dimension_title.clone(),
            row.is_custom_dimension.to_string(),
            row.descriptive.clone(),
            row.quotations.clone(),
            row.interpretive.clone(),
            row.emergent_codes.join(MULTI_VALUE_SEPARATOR),
            row.memo.clone().unwrap_or_default(),
            row.highlight_count.to_string(),
            row.tags.join(MULTI_VALUE_SEPARATOR),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
