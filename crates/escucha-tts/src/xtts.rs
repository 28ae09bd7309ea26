//! HTTP client for an XTTS-style synthesis server.
//!
//! The engine exposes `POST /tts_to_audio/` taking `{text, language,
//! speaker_wav}` and answering with a WAV byte stream. The reply is
//! decoded with `hound` before being handed back, so callers never store
//! an error page or truncated stream as an audio artifact.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;

use crate::{SpeechSynthesizer, SynthesisError, SynthesisRequest};

/// Client for an XTTS-style `tts_to_audio` endpoint.
pub struct XttsEngine {
    client: reqwest::Client,
    base_url: String,
}

impl XttsEngine {
    /// Builds an engine client for the given server.
    ///
    /// Synthesis is slow; the caller picks a timeout generous enough for
    /// the longest passages it expects to render. A default (no-timeout)
    /// client is the last-resort fallback if the builder fails, which
    /// does not happen in practice; the fallback is logged because it
    /// loses the timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "HTTP client builder failed, falling back to a default client without a timeout");
                reqwest::Client::new()
            }
        };

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for XttsEngine {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/tts_to_audio/", self.base_url);

        tracing::debug!(
            text_len = request.text.len(),
            language = %request.language,
            speaker_wav = %request.speaker_wav,
            "Requesting synthesis"
        );

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::error!(status = status.as_u16(), %body, "Synthesis engine error");
            return Err(SynthesisError::Engine {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?.to_vec();
        validate_wav(&bytes)?;

        tracing::info!(audio_bytes = bytes.len(), "Synthesis complete");
        Ok(bytes)
    }
}

/// Checks that the byte stream decodes as WAV.
fn validate_wav(bytes: &[u8]) -> Result<(), SynthesisError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| SynthesisError::InvalidAudio(e.to_string()))?;
    if reader.duration() == 0 {
        return Err(SynthesisError::InvalidAudio("zero-length audio".to_string()));
    }
    Ok(())
}
