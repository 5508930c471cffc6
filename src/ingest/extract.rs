//! Text extraction strategies
//!
//! PDF text comes from an ordered chain of `TextExtractor`s: the embedded text
//! layer first, then OCR of rendered pages.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One way of turning document bytes into text
pub trait TextExtractor {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Reads the embedded text layer of a PDF
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &str {
        "pdf-text"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        // pdf-extract panics on some malformed inputs
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
            Err(_) => Err(ExtractError::Pdf("parser panicked".to_string())),
        }
    }
}

/// Renders PDF pages with `pdftoppm` and recognizes them with `tesseract`
#[derive(Debug, Clone)]
pub struct OcrExtractor {
    language: String,
    resolution: u32,
}

impl OcrExtractor {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            resolution: 300,
        }
    }

    fn render_pages(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<std::path::PathBuf>, ExtractError> {
        let prefix = out_dir.join("page");
        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg(self.resolution.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| ExtractError::Ocr(format!("could not run pdftoppm: {}", e)))?;

        if !output.status.success() {
            return Err(ExtractError::Ocr(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let mut pages: Vec<_> = std::fs::read_dir(out_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "png"))
            .collect();
        // pdftoppm zero-pads page numbers, so name order is page order
        pages.sort();
        Ok(pages)
    }

    fn recognize(&self, image: &Path) -> Result<String, ExtractError> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| ExtractError::Ocr(format!("could not run tesseract: {}", e)))?;

        if !output.status.success() {
            return Err(ExtractError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextExtractor for OcrExtractor {
    fn name(&self) -> &str {
        "ocr"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let workdir = TempDir::new()?;
        let pdf = workdir.path().join("input.pdf");
        std::fs::write(&pdf, bytes)?;

        let pages_dir = workdir.path().join("pages");
        std::fs::create_dir(&pages_dir)?;

        let pages = self.render_pages(&pdf, &pages_dir)?;
        tracing::debug!("OCR over {} page(s)", pages.len());

        let mut text = String::new();
        for page in &pages {
            let page_text = self.recognize(page)?;
            text.push_str(&page_text);
            text.push('\n');
        }
        Ok(text)
    }
}

/// Decodes a text file as UTF-8, falling back to Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
