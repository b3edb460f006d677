//! Routing job description files to the right extractor

use crate::error::{Result, TailorError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::path::Path;

#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a job description as plain text. Files are read fresh on every call.
    pub async fn read_job_text(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(TailorError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(TailorError::UnsupportedFormat(format!(
                    "Unsupported job description file: {} (expected .txt, .md or .pdf)",
                    path.display()
                )));
            }
        };

        Ok(text.trim().to_string())
    }
}
