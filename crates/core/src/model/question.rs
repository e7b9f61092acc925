use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question {id} needs at least two options, got {count}")]
    TooFewOptions { id: QuestionId, count: usize },

    #[error("question {id} has a blank option at index {index}")]
    BlankOption { id: QuestionId, index: usize },

    #[error("correct option {correct} is out of range for question {id} ({count} options)")]
    CorrectOutOfRange {
        id: QuestionId,
        correct: usize,
        count: usize,
    },
}

//
// ─── MULTIPLE CHOICE ───────────────────────────────────────────────────────────
//

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "McqQuestionRecord", into = "McqQuestionRecord")]
pub struct McqQuestion {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    explanation: String,
}

impl McqQuestion {
    /// Build a validated multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two options are
    /// given, an option is blank, or `correct` does not index an option.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                id,
                count: options.len(),
            });
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::BlankOption { id, index });
        }
        if correct >= options.len() {
            return Err(QuestionError::CorrectOutOfRange {
                id,
                correct,
                count: options.len(),
            });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Index of the correct option.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        self.correct == selected
    }
}

/// Serialized shape of an MCQ question; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct McqQuestionRecord {
    id: QuestionId,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    explanation: String,
}

impl TryFrom<McqQuestionRecord> for McqQuestion {
    type Error = QuestionError;

    fn try_from(record: McqQuestionRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.question,
            record.options,
            record.correct_answer,
            record.explanation,
        )
    }
}

impl From<McqQuestion> for McqQuestionRecord {
    fn from(q: McqQuestion) -> Self {
        Self {
            id: q.id,
            question: q.prompt,
            options: q.options,
            correct_answer: q.correct,
            explanation: q.explanation,
        }
    }
}

//
// ─── WRITTEN ───────────────────────────────────────────────────────────────────
//

/// A free-text question graded outside the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WrittenQuestionRecord", into = "WrittenQuestionRecord")]
pub struct WrittenQuestion {
    id: QuestionId,
    prompt: String,
    points: u32,
    expected_length: String,
    sample_answer: Option<String>,
}

impl WrittenQuestion {
    /// Build a validated written question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        points: u32,
        expected_length: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        Ok(Self {
            id,
            prompt,
            points,
            expected_length: expected_length.into(),
            sample_answer: None,
        })
    }

    #[must_use]
    pub fn with_sample_answer(mut self, sample: impl Into<String>) -> Self {
        self.sample_answer = Some(sample.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Human-readable length hint such as `300-400 words`.
    #[must_use]
    pub fn expected_length(&self) -> &str {
        &self.expected_length
    }

    #[must_use]
    pub fn sample_answer(&self) -> Option<&str> {
        self.sample_answer.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WrittenQuestionRecord {
    id: QuestionId,
    question: String,
    points: u32,
    #[serde(default)]
    expected_length: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_answer: Option<String>,
}

impl TryFrom<WrittenQuestionRecord> for WrittenQuestion {
    type Error = QuestionError;

    fn try_from(record: WrittenQuestionRecord) -> Result<Self, Self::Error> {
        let question = Self::new(
            record.id,
            record.question,
            record.points,
            record.expected_length,
        )?;
        Ok(match record.sample_answer {
            Some(sample) => question.with_sample_answer(sample),
            None => question,
        })
    }
}

impl From<WrittenQuestion> for WrittenQuestionRecord {
    fn from(q: WrittenQuestion) -> Self {
        Self {
            id: q.id,
            question: q.prompt,
            points: q.points,
            expected_length: q.expected_length,
            sample_answer: q.sample_answer,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn mcq_rejects_blank_prompt() {
        let err = McqQuestion::new(QuestionId::new(1), "  ", options(&["a", "b"]), 0, "")
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn mcq_rejects_single_option() {
        let err =
            McqQuestion::new(QuestionId::new(1), "Q", options(&["only"]), 0, "").unwrap_err();
        assert!(matches!(err, QuestionError::TooFewOptions { count: 1, .. }));
    }

    #[test]
    fn mcq_rejects_correct_index_out_of_range() {
        let err =
            McqQuestion::new(QuestionId::new(1), "Q", options(&["a", "b"]), 2, "").unwrap_err();
        assert!(matches!(
            err,
            QuestionError::CorrectOutOfRange { correct: 2, count: 2, .. }
        ));
    }

    #[test]
    fn mcq_checks_selected_option() {
        let q = McqQuestion::new(
            QuestionId::new(2),
            "Which data structure is LIFO?",
            options(&["Queue", "Stack", "Array"]),
            1,
            "Stack",
        )
        .unwrap();
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.option(1), Some("Stack"));
        assert_eq!(q.option(3), None);
    }

    #[test]
    fn mcq_deserialization_validates() {
        let json = r#"{"id":1,"question":"Q","options":["a","b"],"correctAnswer":5}"#;
        let err = serde_json::from_str::<McqQuestion>(json).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn written_question_keeps_sample_answer() {
        let json = r#"{"id":3,"question":"Explain DP","points":20,"expectedLength":"300-400 words","sampleAnswer":"Memoize"}"#;
        let q: WrittenQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(q.points(), 20);
        assert_eq!(q.expected_length(), "300-400 words");
        assert_eq!(q.sample_answer(), Some("Memoize"));
    }
}
