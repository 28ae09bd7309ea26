//! Escucha speech-synthesis layer
//!
//! The [`SpeechSynthesizer`] trait is the seam between the HTTP handlers
//! and whatever engine renders passages to audio; [`xtts::XttsEngine`] is
//! the production implementation, talking to an XTTS-style server that
//! does voice-cloning synthesis from a reference sample.

pub mod xtts;

use async_trait::async_trait;
use serde::Serialize;

pub use xtts::XttsEngine;

/// Errors that can occur during speech synthesis.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// HTTP transport or connection error.
    #[error("speech-synthesis request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech-synthesis request timed out")]
    Timeout,

    /// The engine answered with a non-success status (unsupported
    /// language, unknown speaker, internal failure).
    #[error("speech-synthesis engine returned {status}: {body}")]
    Engine {
        /// HTTP status code from the engine.
        status: u16,
        /// Response body, for server-side logs.
        body: String,
    },

    /// The engine's reply was not a decodable WAV stream.
    #[error("speech-synthesis engine returned invalid audio: {0}")]
    InvalidAudio(String),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// One synthesis job: a passage, a target language and a reference voice.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisRequest {
    /// Passage text to render.
    pub text: String,
    /// Target language code (e.g. "es").
    pub language: String,
    /// Reference voice sample the engine clones from.
    pub speaker_wav: String,
}

/// A text-to-speech engine that renders a passage to WAV bytes.
///
/// Implementors must be `Send + Sync` so handlers can share them as
/// `Arc<dyn SpeechSynthesizer>`. Tests substitute canned-audio stubs.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Renders the request to a complete WAV byte stream.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError>;
}
