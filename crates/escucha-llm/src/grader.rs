//! Answer grading via per-question language-model calls.
//!
//! Each submitted answer is judged by its own completion request against
//! the original passage; verdicts come back as free text ("Correct" /
//! "Incorrect" plus an explanation). One call per question is what the
//! system has always done; batching all questions into a single request
//! would be cheaper but is deliberately not attempted here.

use serde::{Deserialize, Serialize};

use crate::client::{LanguageModel, LlmError};
use crate::exercise::{Exercise, QuestionKind};
use crate::prompt;

/// Errors from grading a submission.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// A per-question completion call failed; grading is aborted whole,
    /// with no partial feedback.
    #[error(transparent)]
    Completion(#[from] LlmError),

    /// An answer list does not match its question list in length.
    #[error("submission has {answers} {kind} answers for {questions} questions")]
    AnswerCountMismatch {
        /// Which section is misaligned.
        kind: QuestionKind,
        /// Number of questions in the exercise.
        questions: usize,
        /// Number of answers submitted.
        answers: usize,
    },
}

/// A user's answers to a previously issued exercise.
///
/// Answer lists are positional against the exercise's question lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Selected option letter per multiple-choice question.
    pub mcq_answers: Vec<String>,
    /// Free-text answer per open-ended question.
    pub open_ended_answers: Vec<String>,
}

/// One graded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0-based index of the question this verdict belongs to.
    pub question_index: usize,
    /// Free-text verdict and explanation from the model.
    pub evaluation: String,
}

/// Per-question verdicts for a whole submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Verdicts for the multiple-choice questions, in question order.
    pub mcq_feedback: Vec<Evaluation>,
    /// Verdicts for the open-ended questions, in question order.
    pub open_ended_feedback: Vec<Evaluation>,
}

/// Grades a submission against the exercise it was issued for.
///
/// Answer lists must match the question lists exactly; a mismatch is a
/// validation error rather than a silent truncation, so a client that
/// drops an answer hears about it instead of receiving shortened
/// feedback.
///
/// # Errors
///
/// Returns [`GradeError::AnswerCountMismatch`] on misaligned lists and
/// [`GradeError::Completion`] if any grading call fails.
pub async fn grade_submission(
    llm: &dyn LanguageModel,
    exercise: &Exercise,
    submission: &Submission,
) -> Result<Feedback, GradeError> {
    check_counts(exercise, submission)?;

    let passage = &exercise.text;
    let mut feedback = Feedback {
        mcq_feedback: Vec::with_capacity(submission.mcq_answers.len()),
        open_ended_feedback: Vec::with_capacity(submission.open_ended_answers.len()),
    };

    for (index, (question, selected)) in exercise
        .multiple_choice_questions
        .iter()
        .zip(&submission.mcq_answers)
        .enumerate()
    {
        tracing::debug!(index, selected = %selected, "Grading multiple-choice answer");
        let user_prompt =
            prompt::mcq_evaluation_prompt(passage, &question.question, &question.options, selected);
        let evaluation = llm.complete(None, &user_prompt).await?;
        feedback.mcq_feedback.push(Evaluation {
            question_index: index,
            evaluation: evaluation.trim().to_string(),
        });
    }

    for (index, (question, answer)) in exercise
        .open_ended_questions
        .iter()
        .zip(&submission.open_ended_answers)
        .enumerate()
    {
        tracing::debug!(index, "Grading open-ended answer");
        let user_prompt = prompt::open_evaluation_prompt(passage, &question.question, answer);
        let evaluation = llm.complete(None, &user_prompt).await?;
        feedback.open_ended_feedback.push(Evaluation {
            question_index: index,
            evaluation: evaluation.trim().to_string(),
        });
    }

    tracing::info!(
        mcq_graded = feedback.mcq_feedback.len(),
        open_ended_graded = feedback.open_ended_feedback.len(),
        "Graded submission"
    );

    Ok(feedback)
}

/// Requires exact positional alignment between questions and answers.
fn check_counts(exercise: &Exercise, submission: &Submission) -> Result<(), GradeError> {
    let mcq_questions = exercise.multiple_choice_questions.len();
    if submission.mcq_answers.len() != mcq_questions {
        return Err(GradeError::AnswerCountMismatch {
            kind: QuestionKind::MultipleChoice,
            questions: mcq_questions,
            answers: submission.mcq_answers.len(),
        });
    }

    let open_questions = exercise.open_ended_questions.len();
    if submission.open_ended_answers.len() != open_questions {
        return Err(GradeError::AnswerCountMismatch {
            kind: QuestionKind::OpenEnded,
            questions: open_questions,
            answers: submission.open_ended_answers.len(),
        });
    }

    Ok(())
}
