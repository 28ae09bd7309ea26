//! Escucha language-model layer
//!
//! Chat-completion client plus the exercise generator, curriculum
//! summarizer and answer grader built on top of it.

pub mod client;
pub mod exercise;
pub mod grader;
pub mod prompt;
pub mod summary;

pub use client::{ChatClient, LanguageModel, LlmError};
pub use exercise::{
    extract_json, generate_exercise, AnswerKey, Exercise, ExerciseError, McqOptions,
    MultipleChoiceQuestion, OpenEndedQuestion, QuestionKind,
};
pub use grader::{grade_submission, Evaluation, Feedback, GradeError, Submission};
pub use summary::summarize_curriculum;
