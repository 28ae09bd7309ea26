//! Error types for the Escucha server.
//!
//! Every failure class the HTTP layer can surface is a distinct variant
//! here, so handlers can map "the model is down" and "the model returned
//! garbage" and "your submission is misaligned" to different statuses
//! instead of one generic error.

use std::path::PathBuf;

use escucha_llm::{ExerciseError, GradeError, LlmError};
use escucha_tts::SynthesisError;

/// A specialized `Result` type for Escucha server operations.
pub type Result<T> = std::result::Result<T, EscuchaError>;

/// Errors that can occur while serving Escucha requests.
#[derive(Debug, thiserror::Error)]
pub enum EscuchaError {
    // ========================================================================
    // Configuration
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your escucha.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Curriculum
    // ========================================================================
    /// Curriculum PDF was not found at the configured path.
    #[error("Curriculum not found: '{path}'\n\nSuggestion: Check the 'curriculum' field in escucha.json or place the PDF there")]
    CurriculumNotFound {
        /// Path where the curriculum was expected.
        path: PathBuf,
    },

    /// Text extraction from the curriculum PDF failed.
    #[error("Failed to extract text from curriculum '{path}': {message}\n\nSuggestion: Make sure the file is a readable, text-based PDF")]
    CurriculumExtractError {
        /// Path to the unreadable curriculum.
        path: PathBuf,
        /// Description of the extraction failure.
        message: String,
    },

    /// The curriculum parsed but yielded no text.
    #[error("Curriculum '{path}' contains no extractable text\n\nSuggestion: Scanned PDFs need OCR before they can be used")]
    CurriculumEmpty {
        /// Path to the empty curriculum.
        path: PathBuf,
    },

    // ========================================================================
    // Voice & audio artifacts
    // ========================================================================
    /// The requested reference voice sample does not exist.
    #[error("Reference voice not found: '{path}'\n\nSuggestion: Place the sample in the voices directory or request a different 'speaker_wav'")]
    VoiceNotFound {
        /// Resolved path to the missing sample.
        path: PathBuf,
    },

    /// No stored audio artifact matches the requested identifier.
    #[error("No audio found for id '{id}'")]
    AudioNotFound {
        /// The identifier as received from the client.
        id: String,
    },

    // ========================================================================
    // Upstream calls
    // ========================================================================
    /// Exercise generation failed (model call, JSON contract or schema).
    #[error("Exercise generation failed: {0}")]
    Exercise(#[from] ExerciseError),

    /// Grading failed (model call) or the submission was misaligned.
    #[error("Answer grading failed: {0}")]
    Grading(#[from] GradeError),

    /// Speech synthesis failed (engine call or invalid audio).
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Startup curriculum summarization failed.
    #[error("Curriculum summarization failed: {0}")]
    Summarization(#[from] LlmError),

    // ========================================================================
    // General
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EscuchaError {
    /// Creates a new `ConfigParseError`.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError`.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `CurriculumNotFound` error.
    #[must_use]
    pub fn curriculum_not_found(path: impl Into<PathBuf>) -> Self {
        Self::CurriculumNotFound { path: path.into() }
    }

    /// Creates a new `CurriculumExtractError`.
    #[must_use]
    pub fn curriculum_extract(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CurriculumExtractError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `CurriculumEmpty` error.
    #[must_use]
    pub fn curriculum_empty(path: impl Into<PathBuf>) -> Self {
        Self::CurriculumEmpty { path: path.into() }
    }

    /// Creates a new `VoiceNotFound` error.
    #[must_use]
    pub fn voice_not_found(path: impl Into<PathBuf>) -> Self {
        Self::VoiceNotFound { path: path.into() }
    }

    /// Creates a new `AudioNotFound` error.
    #[must_use]
    pub fn audio_not_found(id: impl Into<String>) -> Self {
        Self::AudioNotFound { id: id.into() }
    }

    /// Returns `true` when the failure originated in an external service
    /// rather than in this process or the client's request.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Exercise(_) | Self::Synthesis(_) | Self::Summarization(_)
                | Self::Grading(GradeError::Completion(_))
        )
    }
}
