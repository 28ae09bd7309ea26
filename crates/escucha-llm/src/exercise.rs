//! Exercise data model and generation.
//!
//! The exercise JSON contract mirrors what the generation prompt asks the
//! model to produce. Downstream consumers (TTS, grading, the web client)
//! all assume this shape, and the model is non-deterministic, so every
//! reply is parsed and schema-checked here before anything else sees it.

use serde::{Deserialize, Serialize};

use crate::client::{LanguageModel, LlmError};
use crate::prompt;

/// Allowed multiple-choice question counts.
pub const MCQ_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

/// Allowed open-ended question counts.
pub const OPEN_ENDED_RANGE: std::ops::RangeInclusive<usize> = 4..=5;

/// Which question list an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// The `multiple_choice_questions` list.
    MultipleChoice,
    /// The `open_ended_questions` list.
    OpenEnded,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleChoice => write!(f, "multiple-choice"),
            Self::OpenEnded => write!(f, "open-ended"),
        }
    }
}

/// Errors from exercise generation and schema validation.
#[derive(Debug, thiserror::Error)]
pub enum ExerciseError {
    /// The completion call itself failed.
    #[error(transparent)]
    Completion(#[from] LlmError),

    /// The model's reply was not valid JSON of the expected shape.
    #[error("exercise response is not valid JSON: {0}")]
    Parse(String),

    /// A required field is absent or empty.
    #[error("exercise response is missing '{0}'")]
    MissingField(&'static str),

    /// A question list is outside its allowed size range.
    #[error("expected {min}-{max} {kind} questions, got {got}")]
    QuestionCount {
        /// Which list was out of range.
        kind: QuestionKind,
        /// Minimum allowed count.
        min: usize,
        /// Maximum allowed count.
        max: usize,
        /// Count actually produced.
        got: usize,
    },

    /// The answer key does not line up with its question list.
    #[error("answer key has {answers} {kind} answers for {questions} questions")]
    AnswerKeyMismatch {
        /// Which section is misaligned.
        kind: QuestionKind,
        /// Number of questions in the exercise.
        questions: usize,
        /// Number of answers in the key.
        answers: usize,
    },
}

/// Options A–D for one multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOptions {
    /// Option A.
    #[serde(rename = "A")]
    pub a: String,
    /// Option B.
    #[serde(rename = "B")]
    pub b: String,
    /// Option C.
    #[serde(rename = "C")]
    pub c: String,
    /// Option D.
    #[serde(rename = "D")]
    pub d: String,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    /// Question text in the target language.
    pub question: String,
    /// The four options.
    pub options: McqOptions,
}

/// One open-ended (fill-in-the-blank) question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenEndedQuestion {
    /// Question text with blank spaces, in the target language.
    pub question: String,
}

/// Answer key for an exercise, positional against the question lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Correct option letter per multiple-choice question.
    pub multiple_choice: Vec<String>,
    /// Correct answer per open-ended question.
    pub open_ended: Vec<String>,
}

/// A generated listening-comprehension exercise.
///
/// Produced fresh per request and round-tripped by the client on
/// submission; never persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// The listening passage in the target language.
    pub text: String,
    /// Multiple-choice questions, in presentation order.
    pub multiple_choice_questions: Vec<MultipleChoiceQuestion>,
    /// Open-ended questions, in presentation order.
    pub open_ended_questions: Vec<OpenEndedQuestion>,
    /// Answer key aligned positionally with the question lists.
    pub answers: AnswerKey,
}

impl Exercise {
    /// Checks the schema invariants the rest of the system relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if the passage is empty, a question list is
    /// outside its allowed range, or the answer key lengths do not match
    /// the question lists.
    pub fn validate(&self) -> Result<(), ExerciseError> {
        if self.text.trim().is_empty() {
            return Err(ExerciseError::MissingField("text"));
        }

        let mcq_count = self.multiple_choice_questions.len();
        if !MCQ_RANGE.contains(&mcq_count) {
            return Err(ExerciseError::QuestionCount {
                kind: QuestionKind::MultipleChoice,
                min: *MCQ_RANGE.start(),
                max: *MCQ_RANGE.end(),
                got: mcq_count,
            });
        }

        let open_count = self.open_ended_questions.len();
        if !OPEN_ENDED_RANGE.contains(&open_count) {
            return Err(ExerciseError::QuestionCount {
                kind: QuestionKind::OpenEnded,
                min: *OPEN_ENDED_RANGE.start(),
                max: *OPEN_ENDED_RANGE.end(),
                got: open_count,
            });
        }

        if self.answers.multiple_choice.len() != mcq_count {
            return Err(ExerciseError::AnswerKeyMismatch {
                kind: QuestionKind::MultipleChoice,
                questions: mcq_count,
                answers: self.answers.multiple_choice.len(),
            });
        }

        if self.answers.open_ended.len() != open_count {
            return Err(ExerciseError::AnswerKeyMismatch {
                kind: QuestionKind::OpenEnded,
                questions: open_count,
                answers: self.answers.open_ended.len(),
            });
        }

        Ok(())
    }
}

/// Strips markdown code fences from a model reply, returning the JSON
/// payload within.
///
/// Models occasionally wrap the requested JSON in ```` ```json ````
/// fences despite being told not to. Falls back to the span between the
/// first `{` and the last `}`, then to the trimmed input.
#[must_use]
pub fn extract_json(content: &str) -> &str {
    if let Some(start) = content.find("```json") {
        if let Some(end) = content[start + 7..].find("```") {
            return content[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = content.find("```") {
        if let Some(end) = content[start + 3..].find("```") {
            let candidate = content[start + 3..start + 3 + end].trim();
            if candidate.starts_with('{') || candidate.starts_with('[') {
                return candidate;
            }
        }
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            return &content[start..=end];
        }
    }

    content.trim()
}

/// Generates a listening exercise grounded on the given text.
///
/// Sends one completion request, strips any code fences, parses the reply
/// as an [`Exercise`] and validates its schema.
///
/// # Errors
///
/// Returns [`ExerciseError::Completion`] when the call fails, `Parse` /
/// `MissingField` when the reply violates the JSON contract, and the
/// count/mismatch variants when the shape is right but the sizes are not.
pub async fn generate_exercise(
    llm: &dyn LanguageModel,
    grounding: &str,
    language: &str,
) -> Result<Exercise, ExerciseError> {
    let user_prompt = prompt::exercise_prompt(grounding, language);
    let reply = llm
        .complete(Some(prompt::GENERATOR_SYSTEM), &user_prompt)
        .await?;

    tracing::debug!(reply_len = reply.len(), "Received exercise completion");

    let json = extract_json(&reply);
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ExerciseError::Parse(e.to_string()))?;

    // The passage feeds straight into TTS; flag its absence distinctly
    // from a generally malformed reply.
    if value
        .get("text")
        .and_then(serde_json::Value::as_str)
        .map_or(true, |text| text.trim().is_empty())
    {
        return Err(ExerciseError::MissingField("text"));
    }

    let exercise: Exercise =
        serde_json::from_value(value).map_err(|e| ExerciseError::Parse(e.to_string()))?;
    exercise.validate()?;

    tracing::info!(
        mcq_count = exercise.multiple_choice_questions.len(),
        open_ended_count = exercise.open_ended_questions.len(),
        passage_len = exercise.text.len(),
        "Generated exercise"
    );

    Ok(exercise)
}
