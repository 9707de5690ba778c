//! Document upload: text recovery, one analysis call, simulated metadata.
//!
//! There is no PDF or Word parsing. Binary office formats are replaced by a
//! fixed sample policy document; everything else is decoded as UTF-8.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use intelliclaim_ai::{LanguageModel, generate_text, prompts};
use intelliclaim_core::{DocumentMetadata, UploadedDocument, next_id, timestamp};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::simulation::SimulatedMetrics;

pub const NO_FILE: &str = "No file provided";

/// Extensions accepted when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt", "eml"];

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    /// Declared MIME type; may be empty.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub struct DocumentIngestor {
    lm: Arc<dyn LanguageModel>,
    model: String,
    allowed_extensions: Vec<String>,
    metrics: Arc<SimulatedMetrics>,
}

impl DocumentIngestor {
    pub fn new(
        lm: Arc<dyn LanguageModel>,
        model: impl Into<String>,
        allowed_extensions: &[String],
        metrics: Arc<SimulatedMetrics>,
    ) -> Self {
        let allowed_extensions = allowed_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            lm,
            model: model.into(),
            allowed_extensions,
            metrics,
        }
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Validate, decode and analyse an upload.
    pub async fn ingest(&self, file: Option<IncomingFile>) -> Result<UploadedDocument, PipelineError> {
        let started = Instant::now();
        let file = file.ok_or_else(|| PipelineError::Upload(NO_FILE.into()))?;
        self.check_extension(&file.name)?;
        if file.bytes.is_empty() {
            return Err(PipelineError::Upload(format!("File {} is empty", file.name)));
        }

        let extracted_text = extract_text(&file);
        debug!(name = %file.name, mime = %file.mime_type, chars = extracted_text.len(), "document text ready");

        let analysis = generate_text(
            self.lm.as_ref(),
            &self.model,
            prompts::document_analysis_prompt(&extracted_text),
            None,
        )
        .await
        .map_err(PipelineError::Ingestion)?;

        let metadata = DocumentMetadata {
            pages: self.metrics.page_count(),
            language: "en".into(),
            confidence: self.metrics.extraction_confidence(),
            word_count: extracted_text.split_whitespace().count(),
            processing_time: self.metrics.item_processing_time(),
        };
        let document = UploadedDocument {
            id: next_id(),
            name: file.name,
            mime_type: file.mime_type,
            size: file.bytes.len(),
            uploaded_at: timestamp(),
            status: "processed".into(),
            extracted_text,
            analysis,
            metadata,
        };
        info!(
            id = document.id,
            name = %document.name,
            size = document.size,
            words = document.metadata.word_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document ingested"
        );
        Ok(document)
    }

    fn check_extension(&self, name: &str) -> Result<(), PipelineError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext {
            Some(ext) if self.allowed_extensions.contains(&ext) => Ok(()),
            Some(ext) => Err(PipelineError::Upload(format!(
                "Unsupported file type .{ext}; allowed: {}",
                self.allowed_extensions.join(", ")
            ))),
            None => Err(PipelineError::Upload(format!(
                "File {name} has no extension; allowed: {}",
                self.allowed_extensions.join(", ")
            ))),
        }
    }
}

/// Text of the upload: the sample policy for PDF/Word, lossy UTF-8 otherwise.
pub fn extract_text(file: &IncomingFile) -> String {
    let mime = file.mime_type.to_lowercase();
    if mime.contains("pdf") || mime.contains("word") {
        sample_policy(&file.name)
    } else {
        String::from_utf8_lossy(&file.bytes).into_owned()
    }
}

fn sample_policy(name: &str) -> String {
    format!(
        "Sample extracted text from {name}.

POLICY TERMS AND CONDITIONS

Section 1: Coverage Details
This policy provides comprehensive medical coverage including:
- Hospitalization expenses up to Rs 5,00,000 per year
- Surgical procedures including orthopedic surgeries
- Emergency treatments and ambulance charges

Section 2: Waiting Periods
- General treatments: No waiting period
- Surgical procedures: 6 months waiting period
- Pre-existing conditions: 2 years waiting period

Section 3: Geographic Coverage
Treatment is covered in the following locations:
- Tier 1 cities: Mumbai, Delhi, Bangalore, Chennai, Pune, Hyderabad
- Tier 2 cities: Ahmedabad, Surat, Jaipur, Lucknow, Kanpur

Section 4: Exclusions
- Cosmetic surgeries
- Dental treatments (unless due to accident)
- Alternative medicine treatments

Section 5: Claim Process
Claims must be submitted within 30 days of discharge with required documents."
    )
}
