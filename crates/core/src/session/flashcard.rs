use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::model::{CardId, FlashCard};

use super::cursor::Cursor;
use super::error::{InvalidTransition, SessionError};
use super::outcome::{
    CompletionReason, SessionKind, SessionOutcome, SessionPhase, SessionProgress, count_u32,
    round_percent,
};
use super::ensure_unique;

/// Where a card stands in the current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    Unseen,
    Correct,
    Incorrect,
}

/// End-of-pass counters shown on the completion screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashcardSummary {
    pub correct: usize,
    pub incorrect: usize,
    pub studied: usize,
    pub total: usize,
    pub accuracy: u8,
}

/// One pass through a deck: flip, self-grade, move on.
///
/// Each studied card maps to the latest self-grade, so a card is always in
/// exactly one of unseen, correct or incorrect.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardSession {
    cards: Arc<[FlashCard]>,
    cursor: Cursor,
    flipped: bool,
    marks: BTreeMap<CardId, bool>,
    phase: SessionPhase,
}

impl FlashcardSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for no cards and `DuplicateItem` if two
    /// cards share an id.
    pub fn start(cards: impl Into<Arc<[FlashCard]>>) -> Result<Self, SessionError> {
        let cards = cards.into();
        let cursor = Cursor::new(cards.len())?;
        ensure_unique(cards.iter().map(FlashCard::id))?;
        Ok(Self {
            cards,
            cursor,
            flipped: false,
            marks: BTreeMap::new(),
            phase: SessionPhase::InProgress,
        })
    }

    #[must_use]
    pub fn cards(&self) -> &[FlashCard] {
        &self.cards
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn current_card(&self) -> &FlashCard {
        &self.cards[self.cursor.index()]
    }

    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase.is_completed()
    }

    #[must_use]
    pub fn status(&self, id: CardId) -> CardStatus {
        match self.marks.get(&id) {
            None => CardStatus::Unseen,
            Some(true) => CardStatus::Correct,
            Some(false) => CardStatus::Incorrect,
        }
    }

    #[must_use]
    pub fn studied(&self) -> BTreeSet<CardId> {
        self.marks.keys().copied().collect()
    }

    #[must_use]
    pub fn correct(&self) -> BTreeSet<CardId> {
        self.ids_marked(true)
    }

    #[must_use]
    pub fn incorrect(&self) -> BTreeSet<CardId> {
        self.ids_marked(false)
    }

    fn ids_marked(&self, value: bool) -> BTreeSet<CardId> {
        self.marks
            .iter()
            .filter(|&(_, &mark)| mark == value)
            .map(|(id, _)| *id)
            .collect()
    }

    fn correct_count(&self) -> usize {
        self.marks.values().filter(|&&mark| mark).count()
    }

    /// Studied cards over deck size.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            position: self.cursor.position(),
            total: self.cards.len(),
            answered: self.marks.len(),
            percent: round_percent(self.marks.len(), self.cards.len()),
            is_complete: self.is_completed(),
        }
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.is_completed() {
            return Err(InvalidTransition::Completed.into());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion.
    pub fn flip(&self) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        Ok(Self {
            flipped: !self.flipped,
            ..self.clone()
        })
    }

    /// Self-grade the current card and move to the next one. Grading the last
    /// card completes the pass.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion and
    /// `InvalidTransition::NotFlipped` while the answer side is hidden.
    pub fn respond(&self, correct: bool) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        if !self.flipped {
            return Err(InvalidTransition::NotFlipped.into());
        }

        let mut next = self.clone();
        next.marks.insert(self.current_card().id(), correct);
        next.flipped = false;
        if self.cursor.is_last() {
            log::debug!(
                "flashcard pass complete: {}/{} correct",
                next.correct_count(),
                next.marks.len()
            );
            next.phase = SessionPhase::Completed(CompletionReason::Exhausted);
        } else {
            next.cursor = self.cursor.forward();
        }
        Ok(next)
    }

    /// Step back without grading. Marks are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion.
    pub fn previous(&self) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        Ok(Self {
            cursor: self.cursor.back(),
            flipped: false,
            ..self.clone()
        })
    }

    /// Step forward without grading. Marks are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion.
    pub fn next(&self) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        Ok(Self {
            cursor: self.cursor.forward(),
            flipped: false,
            ..self.clone()
        })
    }

    /// Back to the first card of the same deck with nothing studied.
    #[must_use]
    pub fn restart(&self) -> Self {
        Self {
            cards: Arc::clone(&self.cards),
            cursor: self.cursor.reset(),
            flipped: false,
            marks: BTreeMap::new(),
            phase: SessionPhase::InProgress,
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    pub fn summary(&self) -> Result<FlashcardSummary, SessionError> {
        if !self.is_completed() {
            return Err(InvalidTransition::NotCompleted.into());
        }
        let correct = self.correct_count();
        let studied = self.marks.len();
        Ok(FlashcardSummary {
            correct,
            incorrect: studied - correct,
            studied,
            total: self.cards.len(),
            accuracy: round_percent(correct, studied),
        })
    }

    /// Untimed; `elapsed_secs` is left for the host to measure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    pub fn outcome(&self) -> Result<SessionOutcome, SessionError> {
        let SessionPhase::Completed(reason) = self.phase else {
            return Err(InvalidTransition::NotCompleted.into());
        };
        let summary = self.summary()?;
        Ok(SessionOutcome {
            kind: SessionKind::Flashcard,
            percent: Some(summary.accuracy),
            correct: count_u32(summary.correct),
            incorrect: count_u32(summary.incorrect),
            answered: count_u32(summary.studied),
            total: count_u32(summary.total),
            elapsed_secs: None,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn deck(n: u64) -> Vec<FlashCard> {
        (1..=n)
            .map(|id| {
                FlashCard::new(CardId::new(id), format!("front {id}"), format!("back {id}"), Difficulty::Medium)
                    .unwrap()
            })
            .collect()
    }

    fn ids(values: &[u64]) -> BTreeSet<CardId> {
        values.iter().copied().map(CardId::new).collect()
    }

    fn answer(s: &FlashcardSession, correct: bool) -> FlashcardSession {
        s.flip().unwrap().respond(correct).unwrap()
    }

    #[test]
    fn start_initialises_empty_sets() {
        let s = FlashcardSession::start(deck(5)).unwrap();
        assert_eq!(s.cursor().index(), 0);
        assert!(!s.is_flipped());
        assert!(s.studied().is_empty());
        assert!(s.correct().is_empty());
        assert!(s.incorrect().is_empty());
        assert!(!s.is_completed());
    }

    #[test]
    fn respond_requires_flip() {
        let s = FlashcardSession::start(deck(2)).unwrap();
        assert_eq!(
            s.respond(true).unwrap_err(),
            SessionError::InvalidTransition(InvalidTransition::NotFlipped)
        );
        // Flipping twice hides the answer again.
        assert!(!s.flip().unwrap().flip().unwrap().is_flipped());
    }

    #[test]
    fn navigation_does_not_touch_marks() {
        let s = FlashcardSession::start(deck(5)).unwrap();
        let s = answer(&s, true);
        let s = answer(&s, false);
        assert_eq!(s.cursor().index(), 2);

        let s = s.previous().unwrap().previous().unwrap().next().unwrap();
        assert_eq!(s.cursor().index(), 1);
        assert_eq!(s.correct(), ids(&[1]));
        assert_eq!(s.incorrect(), ids(&[2]));
        assert_eq!(s.studied(), ids(&[1, 2]));
    }

    #[test]
    fn regrading_moves_between_sets() {
        let s = FlashcardSession::start(deck(3)).unwrap();
        let s = answer(&s, true).previous().unwrap();
        let s = answer(&s, false);
        assert_eq!(s.status(CardId::new(1)), CardStatus::Incorrect);
        assert!(s.correct().is_disjoint(&s.incorrect()));
        assert_eq!(s.studied(), ids(&[1]));
    }

    #[test]
    fn navigation_resets_flip_and_clamps() {
        let s = FlashcardSession::start(deck(2)).unwrap().flip().unwrap();
        let s = s.previous().unwrap();
        assert_eq!(s.cursor().index(), 0);
        assert!(!s.is_flipped());
        let s = s.next().unwrap().next().unwrap();
        assert_eq!(s.cursor().index(), 1);
    }

    #[test]
    fn last_response_completes_and_summarises() {
        let mut s = FlashcardSession::start(deck(4)).unwrap();
        for correct in [true, true, false, true] {
            s = answer(&s, correct);
        }
        assert!(s.is_completed());
        assert_eq!(s.cursor().index(), 3);
        let summary = s.summary().unwrap();
        assert_eq!(summary.correct, 3);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.accuracy, 75);

        let completed = SessionError::InvalidTransition(InvalidTransition::Completed);
        assert_eq!(s.flip().unwrap_err(), completed);
        assert_eq!(s.next().unwrap_err(), completed);
        assert_eq!(s.previous().unwrap_err(), completed);
    }

    #[test]
    fn accuracy_counts_only_studied_cards() {
        // Skip straight to the last card and grade only that one.
        let s = FlashcardSession::start(deck(3))
            .unwrap()
            .next()
            .unwrap()
            .next()
            .unwrap();
        let s = answer(&s, false);
        let summary = s.summary().unwrap();
        assert_eq!(summary.studied, 1);
        assert_eq!(summary.accuracy, 0);
        assert_eq!(s.outcome().unwrap().reason, CompletionReason::Exhausted);
    }

    #[test]
    fn restart_keeps_cards_and_clears_progress() {
        let mut s = FlashcardSession::start(deck(5)).unwrap();
        for _ in 0..5 {
            s = answer(&s, true);
        }
        let s = s.restart();
        assert_eq!(s.cursor().index(), 0);
        assert!(s.studied().is_empty());
        assert!(s.correct().is_empty());
        assert!(s.incorrect().is_empty());
        assert_eq!(s.cards().len(), 5);
        assert_eq!(s.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn summary_requires_completion() {
        let s = FlashcardSession::start(deck(2)).unwrap();
        assert_eq!(
            s.summary().unwrap_err(),
            SessionError::InvalidTransition(InvalidTransition::NotCompleted)
        );
        assert_eq!(s.progress().percent, 0);
    }
}
