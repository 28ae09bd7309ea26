//! Prompt templates for exercise generation, summarization and grading.
//!
//! These are best-effort instructions to an external model with no schema
//! enforcement at the boundary; the JSON parse in [`crate::exercise`] is
//! the real trust boundary.

use crate::exercise::McqOptions;

/// System message for the exercise-generation call.
pub const GENERATOR_SYSTEM: &str = "You are a helpful assistant.";

/// System message for the curriculum-summarization call.
pub const SUMMARY_SYSTEM: &str =
    "You are an assistant that summarizes educational curriculum content.";

/// Builds the exercise-generation prompt.
///
/// `grounding` is either the curriculum text or a caller-supplied topic;
/// `language` is the target language code for the passage and questions.
/// JSON keys stay in English regardless of the target language.
#[must_use]
pub fn exercise_prompt(grounding: &str, language: &str) -> String {
    format!(
        r#"You are a language teacher preparing a listening practice exercise.

Based on the following curriculum content or topic, please create a listening practice exercise.

Use the target language "{language}" for the listening text and all question content, but keep the JSON keys in English.

Ensure that:
- There are between 3 and 5 multiple-choice questions.
- There are between 4 and 5 open-ended questions.
- All questions are directly related to the listening text and do not ask personal or unrelated questions.

Format it as a JSON object with the following structure:

{{
  "text": "[The listening text in the target language]",
  "multiple_choice_questions": [
    {{
      "question": "[Question in the target language]",
      "options": {{
        "A": "[Option A]",
        "B": "[Option B]",
        "C": "[Option C]",
        "D": "[Option D]"
      }}
    }}
  ],
  "open_ended_questions": [
    {{
      "question": "[Text in the target language with blank spaces]"
    }}
  ],
  "answers": {{
    "multiple_choice": [
      "[Correct option (A, B, C, or D)]"
    ],
    "open_ended": [
      "[Correct answer for the blank in each open-ended question]"
    ]
  }}
}}

### Curriculum Content or Topic:
"{grounding}"

Please output only the JSON object and ensure it is valid JSON without any additional text.
"#
    )
}

/// Builds the curriculum-summarization prompt.
#[must_use]
pub fn summary_prompt(content: &str) -> String {
    format!(
        r"Please summarize the following curriculum content into an extensive list of key topics, each accompanied by a brief example.
There is no need to create numbered lists or bold words, just information.

### Curriculum Content:
{content}

### Summary:
"
    )
}

/// Builds the grading prompt for one multiple-choice answer.
#[must_use]
pub fn mcq_evaluation_prompt(
    passage: &str,
    question: &str,
    options: &McqOptions,
    selected: &str,
) -> String {
    format!(
        r#"You are an assistant that evaluates answers to listening comprehension questions.

Given the following listening text:

"{passage}"

And the following multiple-choice question:

Question: "{question}"
Options:
A: {a}
B: {b}
C: {c}
D: {d}

The user selected option: "{selected}"

Determine if the user's answer is correct based solely on the listening text and question. Respond with "Correct" or "Incorrect" and provide a brief explanation in English.
"#,
        a = options.a,
        b = options.b,
        c = options.c,
        d = options.d,
    )
}

/// Builds the grading prompt for one open-ended answer.
#[must_use]
pub fn open_evaluation_prompt(passage: &str, question: &str, answer: &str) -> String {
    format!(
        r#"You are an assistant that evaluates answers to listening comprehension questions.

Given the following listening text:

"{passage}"

And the following open-ended question:

Question: "{question}"

The user's answer: "{answer}"

Determine if the user's answer is correct based solely on the listening text and question. Respond with "Correct" or "Incorrect" and provide a brief explanation in English.
"#
    )
}
