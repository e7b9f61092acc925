use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::flashcard::Difficulty;
use crate::model::ids::{DeckId, ExamId, ResultId};
use crate::session::round_percent;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("exam {0} must last at least one minute")]
    ZeroDuration(ExamId),

    #[error("deck {id} reports {mastered} mastered cards out of {cards}")]
    MasteredExceedsCards { id: DeckId, mastered: u32, cards: u32 },

    #[error("result {id} scores {score} out of {max_score} (at most 100)")]
    ScoreOutOfRange { id: ResultId, score: u8, max_score: u8 },

    #[error("result {id} has {correct} correct answers out of {total}")]
    CorrectExceedsTotal { id: ResultId, correct: u32, total: u32 },
}

//
// ─── EXAMS ─────────────────────────────────────────────────────────────────────
//

/// Which simulator an exam template opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamKind {
    Mcq,
    Written,
    Mixed,
}

/// The concrete test a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    Mcq,
    Written,
}

impl ExamKind {
    /// The test opened first when the exam starts. Mixed exams begin with MCQ.
    #[must_use]
    pub fn initial_test(self) -> TestKind {
        match self {
            ExamKind::Mcq | ExamKind::Mixed => TestKind::Mcq,
            ExamKind::Written => TestKind::Written,
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestKind::Mcq => "mcq",
            TestKind::Written => "written",
        })
    }
}

impl fmt::Display for ExamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExamKind::Mcq => "mcq",
            ExamKind::Written => "written",
            ExamKind::Mixed => "mixed",
        })
    }
}

/// Exam definition listed on the exam preparation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamTemplate {
    pub id: ExamId,
    pub title: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: ExamKind,
    /// Duration in minutes.
    pub duration: u32,
    /// Nominal question count advertised on the template.
    pub questions: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score: Option<u8>,
}

impl ExamTemplate {
    /// # Errors
    ///
    /// Returns `CatalogError` for a blank title or zero duration.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::EmptyTitle);
        }
        if self.duration == 0 {
            return Err(CatalogError::ZeroDuration(self.id));
        }
        Ok(())
    }

    /// Countdown length for a session started from this template.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration.saturating_mul(60)
    }
}

//
// ─── FLASHCARD SETS ────────────────────────────────────────────────────────────
//

/// Deck metadata shown in the flashcard manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
    pub id: DeckId,
    pub title: String,
    pub subject: String,
    pub card_count: u32,
    #[serde(default)]
    pub studied_today: u32,
    #[serde(default)]
    pub mastered_cards: u32,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl FlashcardSet {
    /// # Errors
    ///
    /// Returns `CatalogError` for a blank title or inconsistent mastery counts.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::EmptyTitle);
        }
        if self.mastered_cards > self.card_count {
            return Err(CatalogError::MasteredExceedsCards {
                id: self.id,
                mastered: self.mastered_cards,
                cards: self.card_count,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn mastery_percent(&self) -> u8 {
        round_percent(self.mastered_cards as usize, self.card_count as usize)
    }

    /// Case-insensitive match on title or subject. An empty query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.subject.to_lowercase().contains(&query)
    }
}
