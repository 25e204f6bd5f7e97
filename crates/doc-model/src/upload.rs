//! Turning uploaded bytes into a `GuideDocument`

use crate::project::{GuideDocument, GuideStatus, Timestamp};
use sha2::{Digest, Sha256};
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const BINARY_MIME_TYPE: &str = "application/octet-stream";

/// Raw file handed over by a file picker or the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl GuideUpload {
    /// Build an upload, inferring the MIME type from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_type_for(&file_name).to_owned();
        Self { file_name, mime_type, bytes }
    }

    /// Hex-encoded SHA-256 of the payload.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.bytes)
    }
}

pub fn fingerprint(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|byte| format!("{byte:02x}")).collect()
}

/// MIME type guessed from the file extension.
pub fn mime_type_for(file_name: &str) -> &'static str {
    let is_pdf = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        PDF_MIME_TYPE
    } else {
        BINARY_MIME_TYPE
    }
}

/// Guide id derived from a content fingerprint.
pub fn guide_id_for_fingerprint(fingerprint: &str) -> String {
    let prefix: String = fingerprint.chars().take(16).collect();
    format!("guide-{prefix}")
}

/// Build the guide record for an upload. The title is the file stem.
pub fn guide_from_upload(upload: &GuideUpload, now: Timestamp) -> GuideDocument {
    let fingerprint = upload.fingerprint();
    let id = guide_id_for_fingerprint(&fingerprint);

    let title = Path::new(&upload.file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(upload.file_name.as_str())
        .to_owned();

    GuideDocument {
        storage_file_name: format!("{id}.bin"),
        id,
        title,
        description: None,
        institution: None,
        year: None,
        status: GuideStatus::NotStarted,
        source_file_name: upload.file_name.clone(),
        mime_type: Some(upload.mime_type.clone()),
        fingerprint: Some(fingerprint),
        created_at: now,
        updated_at: now,
    }
}
