//! Optional startup summarization of the raw curriculum extraction.
//!
//! PDF extractions are long and noisy; condensing them into a topic list
//! keeps every generation prompt small and focused.

use crate::client::{LanguageModel, LlmError};
use crate::prompt;

/// Condenses raw curriculum text into a key-topic summary via one
/// completion call.
///
/// # Errors
///
/// Returns [`LlmError`] if the call fails or the model replies with
/// nothing usable.
pub async fn summarize_curriculum(
    llm: &dyn LanguageModel,
    content: &str,
) -> Result<String, LlmError> {
    let reply = llm
        .complete(Some(prompt::SUMMARY_SYSTEM), &prompt::summary_prompt(content))
        .await?;

    let summary = reply.trim().to_string();
    if summary.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    tracing::info!(
        input_len = content.len(),
        summary_len = summary.len(),
        "Summarized curriculum"
    );

    Ok(summary)
}
