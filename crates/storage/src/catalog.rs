use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use study_core::model::{
    CatalogError, DeckId, ExamId, ExamTemplate, FlashCard, FlashcardSet, McqQuestion, ResultId,
    TestResult, WrittenQuestion,
};

/// An exam template together with its question banks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamEntry {
    #[serde(flatten)]
    pub template: ExamTemplate,
    #[serde(default)]
    pub mcq_questions: Vec<McqQuestion>,
    #[serde(default)]
    pub written_questions: Vec<WrittenQuestion>,
}

/// A flashcard set together with its cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    #[serde(flatten)]
    pub set: FlashcardSet,
    #[serde(default)]
    pub cards: Vec<FlashCard>,
}

/// Everything the repository is seeded with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub exams: Vec<ExamEntry>,
    #[serde(default)]
    pub decks: Vec<DeckEntry>,
    #[serde(default)]
    pub results: Vec<TestResult>,
}

/// Problems found while checking a catalog before it is loaded.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogIssue {
    #[error(transparent)]
    Entry(#[from] CatalogError),

    #[error("exam id {0} is used more than once")]
    DuplicateExam(ExamId),

    #[error("deck id {0} is used more than once")]
    DuplicateDeck(DeckId),

    #[error("result id {0} is used more than once")]
    DuplicateResult(ResultId),
}

impl Catalog {
    /// Validate every template and result, and check ids are unique.
    ///
    /// Question and card contents are validated when deserialized.
    ///
    /// # Errors
    ///
    /// Returns the first `CatalogIssue` found.
    pub fn validate(&self) -> Result<(), CatalogIssue> {
        let mut exam_ids = HashSet::new();
        for entry in &self.exams {
            entry.template.validate()?;
            if !exam_ids.insert(entry.template.id) {
                return Err(CatalogIssue::DuplicateExam(entry.template.id));
            }
        }
        let mut deck_ids = HashSet::new();
        for entry in &self.decks {
            entry.set.validate()?;
            if !deck_ids.insert(entry.set.id) {
                return Err(CatalogIssue::DuplicateDeck(entry.set.id));
            }
        }
        let mut result_ids = HashSet::new();
        for result in &self.results {
            result.validate()?;
            if !result_ids.insert(result.id) {
                return Err(CatalogIssue::DuplicateResult(result.id));
            }
        }
        Ok(())
    }
}
