//! Configuration types for the Escucha server.
//!
//! All tunables live in `escucha.json` in the working directory; every
//! field has a default so a missing file yields a runnable configuration
//! pointed at localhost services.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EscuchaError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "escucha.json";

/// Default curriculum PDF path.
fn default_curriculum() -> String {
    "curriculum.pdf".to_string()
}

/// Default directory holding reference voice samples.
fn default_voices_dir() -> String {
    "voices".to_string()
}

/// Default directory for generated audio artifacts.
fn default_audio_dir() -> String {
    ".escucha/audio".to_string()
}

/// Default chat-completion endpoint.
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default model for exercise generation and grading.
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default environment variable holding the API key.
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default per-request timeout for language-model calls.
const fn default_llm_timeout() -> u64 {
    60
}

/// Default synthesis-server endpoint.
fn default_tts_base_url() -> String {
    "http://127.0.0.1:8020".to_string()
}

/// Default per-request timeout for synthesis calls. Rendering a full
/// passage takes far longer than a completion.
const fn default_tts_timeout() -> u64 {
    120
}

/// Default target language for generated exercises.
fn default_language() -> String {
    "es".to_string()
}

/// Default reference voice sample.
fn default_speaker_wav() -> String {
    "esp1.wav".to_string()
}

/// Main configuration for the Escucha server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Path to the curriculum PDF the exercises are grounded on.
    #[serde(default = "default_curriculum")]
    pub curriculum: String,

    /// Directory holding reference voice samples.
    #[serde(default = "default_voices_dir")]
    pub voices_dir: String,

    /// Directory generated audio artifacts are written to.
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,

    /// Summarize the curriculum extraction once at startup and ground
    /// all generations on the summary instead of the raw text.
    #[serde(default)]
    pub summarize_on_start: bool,

    /// Language-model endpoint configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Speech-synthesis endpoint configuration.
    #[serde(default)]
    pub tts: TtsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            curriculum: default_curriculum(),
            voices_dir: default_voices_dir(),
            audio_dir: default_audio_dir(),
            summarize_on_start: false,
            llm: LlmConfig::default(),
            tts: TtsConfig::default(),
        }
    }
}

/// Connection settings for the chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model name for generation, summarization and grading.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key. An unset or
    /// empty variable means requests go out unauthenticated (local
    /// providers).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Connection settings for the synthesis server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsConfig {
    /// Base URL of the XTTS-style synthesis server.
    #[serde(default = "default_tts_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// Target language when the request does not name one.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Reference voice when the request does not name one.
    #[serde(default = "default_speaker_wav")]
    pub default_speaker_wav: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_tts_base_url(),
            timeout_secs: default_tts_timeout(),
            default_language: default_language(),
            default_speaker_wav: default_speaker_wav(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `escucha.json`; a missing file yields the validated
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            EscuchaError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `escucha.json` exists there but contains
    /// invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns validated defaults.
    ///
    /// # Errors
    ///
    /// Returns `EscuchaError::ConfigParseError` on invalid JSON and
    /// `EscuchaError::ConfigValidationError` on invalid values.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(EscuchaError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| EscuchaError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `EscuchaError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.curriculum.trim().is_empty() {
            return Err(EscuchaError::config_validation(
                "curriculum path must not be empty",
                "Provide a valid PDF path in your escucha.json",
            ));
        }

        if self.voices_dir.trim().is_empty() {
            return Err(EscuchaError::config_validation(
                "voicesDir must not be empty",
                "Provide the directory holding reference voice samples",
            ));
        }

        if self.audio_dir.trim().is_empty() {
            return Err(EscuchaError::config_validation(
                "audioDir must not be empty",
                "Provide a writable directory for generated audio",
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(EscuchaError::config_validation(
                "llm.model must not be empty",
                "Name the chat model to use (e.g. gpt-4o-mini)",
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(EscuchaError::config_validation(
                "llm.timeoutSecs must be greater than 0",
                "Set llm.timeoutSecs to at least 1 second",
            ));
        }

        if self.tts.timeout_secs == 0 {
            return Err(EscuchaError::config_validation(
                "tts.timeoutSecs must be greater than 0",
                "Set tts.timeoutSecs to at least 1 second",
            ));
        }

        if self.tts.default_language.trim().is_empty() {
            return Err(EscuchaError::config_validation(
                "tts.defaultLanguage must not be empty",
                "Set tts.defaultLanguage to a language code such as 'es'",
            ));
        }

        if self.tts.default_speaker_wav.trim().is_empty() {
            return Err(EscuchaError::config_validation(
                "tts.defaultSpeakerWav must not be empty",
                "Name a sample file inside voicesDir",
            ));
        }

        Ok(())
    }
}
