//! Ingestion normalizer
//!
//! Turns a manifest of local files into search documents, either by reading
//! pre-structured JSON or by extracting and enriching raw text. A bad item is
//! skipped and reported, never fatal.

mod enrich;
mod extract;
mod record;

pub use enrich::{Enricher, Enrichment, NoEnrichment, TermFrequencyEnricher, Topic};
pub use extract::{decode_text, ExtractError, OcrExtractor, PdfTextExtractor, TextExtractor};
pub use record::{derive_id, DocumentRecord, ID_FIELD};

use crate::archive::FetchedFile;
use crate::config::{EnrichmentKind, IngestConfig};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Source tag of records derived from scraped documents
pub const WEBSCRAPING_SOURCE: &str = "webscraping";

/// How manifest entries become records
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IngestMethod {
    /// Each entry is a JSON object used as the record fields
    Json,
    /// Text is extracted from PDF/TXT entries and enriched
    Text,
}

/// A manifest entry that produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<DocumentRecord>,
    pub skipped: Vec<Skipped>,
}

pub struct Normalizer {
    extractors: Vec<Box<dyn TextExtractor>>,
    enricher: Box<dyn Enricher>,
    min_text_length: usize,
    ocr_threshold: usize,
}

impl Normalizer {
    pub fn new(
        extractors: Vec<Box<dyn TextExtractor>>,
        enricher: Box<dyn Enricher>,
        min_text_length: usize,
        ocr_threshold: usize,
    ) -> Self {
        Self {
            extractors,
            enricher,
            min_text_length,
            ocr_threshold,
        }
    }

    /// Builds the extraction chain and enricher described by the configuration
    pub fn from_config(config: &IngestConfig) -> Self {
        let mut extractors: Vec<Box<dyn TextExtractor>> = vec![Box::new(PdfTextExtractor)];
        if config.ocr_enabled {
            extractors.push(Box::new(OcrExtractor::new(config.ocr_language.clone())));
        }

        let enricher: Box<dyn Enricher> = match config.enrichment {
            EnrichmentKind::None => Box::new(NoEnrichment),
            EnrichmentKind::TermFrequency => Box::new(TermFrequencyEnricher::default()),
        };

        Self::new(
            extractors,
            enricher,
            config.min_text_length,
            config.ocr_threshold,
        )
    }

    /// Normalizes a file manifest into records, in manifest order
    pub fn normalize(&self, files: &[FetchedFile], method: IngestMethod) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome::default();

        for file in files {
            let result = match method {
                IngestMethod::Json => self.json_record(file),
                IngestMethod::Text => self.text_record(file),
            };

            match result {
                Ok(record) => outcome.records.push(record),
                Err(reason) => {
                    tracing::warn!("Skipping {}: {}", file.path.display(), reason);
                    outcome.skipped.push(Skipped {
                        path: file.path.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            "Normalized {} record(s), skipped {}",
            outcome.records.len(),
            outcome.skipped.len()
        );
        outcome
    }

    fn json_record(&self, file: &FetchedFile) -> Result<DocumentRecord, String> {
        if file.extension != "json" {
            return Err(format!("unsupported extension '{}'", file.extension));
        }

        let content = std::fs::read(&file.path).map_err(|e| format!("read failed: {}", e))?;
        let value: Value =
            serde_json::from_slice(&content).map_err(|e| format!("invalid JSON: {}", e))?;

        match value {
            Value::Object(fields) => Ok(DocumentRecord::new(fields, &file.source_key())),
            _ => Err("JSON document is not an object".to_string()),
        }
    }

    fn text_record(&self, file: &FetchedFile) -> Result<DocumentRecord, String> {
        let bytes = match file.extension.as_str() {
            "pdf" | "txt" => {
                std::fs::read(&file.path).map_err(|e| format!("read failed: {}", e))?
            }
            other => return Err(format!("unsupported extension '{}'", other)),
        };

        let text = if file.extension == "pdf" {
            self.extract_pdf_text(&bytes)
                .ok_or_else(|| "no text could be extracted".to_string())?
        } else {
            decode_text(&bytes)
        };

        let text = text.trim();
        let length = text.chars().count();
        if length < self.min_text_length {
            return Err(format!(
                "text too short ({} < {} characters)",
                length, self.min_text_length
            ));
        }

        let enrichment = self.enricher.enrich(text);

        let mut fields = Map::new();
        fields.insert("fuente".into(), Value::from(WEBSCRAPING_SOURCE));
        fields.insert("texto_completo".into(), Value::from(text));
        fields.insert(
            "fecha_ingesta".into(),
            Value::from(chrono::Utc::now().to_rfc3339()),
        );
        fields.insert("ruta".into(), Value::from(file.path.display().to_string()));
        fields.insert("nombre_archivo".into(), Value::from(file.name.as_str()));
        fields.insert("resumen".into(), Value::from(enrichment.resumen));
        fields.insert(
            "entidades".into(),
            serde_json::to_value(&enrichment.entidades).unwrap_or_default(),
        );
        fields.insert(
            "temas".into(),
            serde_json::to_value(&enrichment.temas).unwrap_or_default(),
        );

        Ok(DocumentRecord::new(fields, &file.source_key()))
    }

    /// Runs the extraction chain over PDF bytes
    ///
    /// The first result reaching the OCR threshold wins; otherwise the
    /// longest non-empty result is kept.
    fn extract_pdf_text(&self, bytes: &[u8]) -> Option<String> {
        let mut best: Option<(usize, String)> = None;

        for extractor in &self.extractors {
            match extractor.extract(bytes) {
                Ok(text) => {
                    let length = text.trim().chars().count();
                    tracing::debug!("{} produced {} characters", extractor.name(), length);
                    if length >= self.ocr_threshold {
                        return Some(text);
                    }
                    if length > 0 && best.as_ref().map_or(true, |(l, _)| length > *l) {
                        best = Some((length, text));
                    }
                }
                Err(e) => tracing::warn!("{} failed: {}", extractor.name(), e),
            }
        }

        best.map(|(_, text)| text)
    }
}
