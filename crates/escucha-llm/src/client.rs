//! Chat-completion client for OpenAI-compatible endpoints.
//!
//! [`ChatClient`] speaks the `/chat/completions` wire format, so it works
//! against OpenAI itself as well as local stand-ins (Ollama in OpenAI mode,
//! vLLM, LM Studio). All connection details come from the caller; nothing
//! is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors that can occur while talking to the language model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("language-model request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("language-model request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("language-model API returned {status}: {body}")]
    Api {
        /// HTTP status code from the upstream API.
        status: u16,
        /// Response body, for server-side logs.
        body: String,
    },

    /// The HTTP response could not be parsed as a chat completion.
    #[error("failed to parse language-model response: {0}")]
    Parse(String),

    /// The completion carried no usable text content.
    #[error("language model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// A language model that can answer a single prompt with free text.
///
/// Implementors must be `Send + Sync` so handlers can share them as
/// `Arc<dyn LanguageModel>`. Tests substitute scripted stubs.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends one completion request and returns the model's text reply.
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, LlmError>;
}

/// One message in a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("system", "user" or "assistant").
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Request body for `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

/// Response body for `/chat/completions` (the fields we consume).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    /// Builds a client for the given endpoint and model.
    ///
    /// The per-request timeout is baked into the underlying HTTP client.
    /// A default (no-timeout) client is the last-resort fallback if the
    /// builder fails, which does not happen in practice; the fallback is
    /// logged because it loses the timeout.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
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
            api_key,
            model: model.into(),
        }
    }

    /// The model name requests are sent with.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.client.post(&url).json(&request);

        // Attach the Authorization header only when a non-empty key is
        // configured; local providers need none.
        let key = self.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::error!(status = status.as_u16(), %body, "Language-model API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(LlmError::EmptyResponse)?;

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(content)
    }
}
