use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::CardId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("card {0} front cannot be empty")]
    EmptyFront(CardId),

    #[error("card {0} back cannot be empty")]
    EmptyBack(CardId),
}

/// Difficulty tag shared by cards, decks and exams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Short description shown next to a result.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "Basic concepts and fundamental knowledge",
            Difficulty::Medium => "Intermediate application and analysis",
            Difficulty::Hard => "Advanced problem solving and synthesis",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A two-sided study card.
///
/// `mastered` is informational; study sessions never change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FlashCardRecord", into = "FlashCardRecord")]
pub struct FlashCard {
    id: CardId,
    front: String,
    back: String,
    difficulty: Difficulty,
    mastered: bool,
}

impl FlashCard {
    /// # Errors
    ///
    /// Returns `CardError` if either side is blank.
    pub fn new(
        id: CardId,
        front: impl Into<String>,
        back: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, CardError> {
        let front = front.into();
        let back = back.into();
        if front.trim().is_empty() {
            return Err(CardError::EmptyFront(id));
        }
        if back.trim().is_empty() {
            return Err(CardError::EmptyBack(id));
        }
        Ok(Self {
            id,
            front,
            back,
            difficulty,
            mastered: false,
        })
    }

    #[must_use]
    pub fn mastered(mut self, mastered: bool) -> Self {
        self.mastered = mastered;
        self
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.mastered
    }

    /// Case-insensitive match against either side of the card.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.front.to_lowercase().contains(&query)
            || self.back.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlashCardRecord {
    id: CardId,
    front: String,
    back: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    mastered: bool,
}

impl TryFrom<FlashCardRecord> for FlashCard {
    type Error = CardError;

    fn try_from(record: FlashCardRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(record.id, record.front, record.back, record.difficulty)?
            .mastered(record.mastered))
    }
}

impl From<FlashCard> for FlashCardRecord {
    fn from(card: FlashCard) -> Self {
        Self {
            id: card.id,
            front: card.front,
            back: card.back,
            difficulty: card.difficulty,
            mastered: card.mastered,
        }
    }
}
