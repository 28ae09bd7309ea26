//! Curriculum loading for the Escucha server.
//!
//! The curriculum PDF is read once at process start; its extracted text
//! is immutable for the lifetime of the process and shared read-only by
//! every request. Updating the document requires a restart.

use std::path::{Path, PathBuf};

use crate::error::{EscuchaError, Result};

/// In-memory representation of the loaded curriculum.
#[derive(Debug, Clone)]
pub struct Curriculum {
    /// Path to the source document.
    pub path: PathBuf,

    /// Extracted, whitespace-normalized text.
    pub content: String,

    /// Size of the source file in bytes.
    pub size_bytes: u64,
}

impl Curriculum {
    /// Loads and extracts the curriculum from a PDF.
    ///
    /// # Errors
    ///
    /// Returns `EscuchaError::CurriculumNotFound` if the file doesn't
    /// exist, `CurriculumExtractError` if text extraction fails, and
    /// `CurriculumEmpty` if the document yields no text (e.g. a scan
    /// with no text layer).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EscuchaError::curriculum_not_found(path)
            } else {
                EscuchaError::Io(e)
            }
        })?;

        let raw = pdf_extract::extract_text(path)
            .map_err(|e| EscuchaError::curriculum_extract(path, e.to_string()))?;

        let content = normalize_whitespace(&raw);
        if content.is_empty() {
            return Err(EscuchaError::curriculum_empty(path));
        }

        let canonical_path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        Ok(Self {
            path: canonical_path,
            content,
            size_bytes: metadata.len(),
        })
    }

    /// Builds a curriculum from already-extracted text.
    ///
    /// Used by tests and by startup summarization, which replaces the
    /// raw extraction with the model's summary.
    ///
    /// # Errors
    ///
    /// Returns `EscuchaError::CurriculumEmpty` if the text normalizes to
    /// nothing.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        let content = normalize_whitespace(text);
        if content.is_empty() {
            return Err(EscuchaError::curriculum_empty(path));
        }

        let size_bytes = text.len() as u64;
        Ok(Self {
            path,
            content,
            size_bytes,
        })
    }
}

/// Collapses all runs of whitespace to single spaces.
///
/// PDF extraction scatters hard line breaks and column padding through
/// the text; none of it matters to a prompt, and collapsing it keeps the
/// grounding compact.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
