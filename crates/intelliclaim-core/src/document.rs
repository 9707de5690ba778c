//! Uploaded document types returned by `POST /upload-document`.

use serde::{Deserialize, Serialize};

/// Extraction metadata attached to an uploaded document.
///
/// `pages`, `confidence` and `processing_time` are simulated; see the engine's
/// simulation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub pages: u32,
    pub language: String,
    pub confidence: f64,
    pub word_count: usize,
    pub processing_time: String,
}

/// A processed upload held for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub id: u64,
    pub name: String,
    /// Declared MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes.
    pub size: usize,
    /// RFC 3339 timestamp string.
    pub uploaded_at: String,
    pub status: String,
    pub extracted_text: String,
    pub analysis: String,
    pub metadata: DocumentMetadata,
}

impl UploadedDocument {
    /// The part of the document the query pipeline consumes.
    pub fn context(&self) -> crate::DocumentContext {
        crate::DocumentContext {
            name: self.name.clone(),
            extracted_text: self.extracted_text.clone(),
        }
    }
}
