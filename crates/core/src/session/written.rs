use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{QuestionId, WrittenQuestion};

use super::countdown::Countdown;
use super::cursor::Cursor;
use super::error::{InvalidTransition, ItemId, SessionError};
use super::outcome::{
    CompletionReason, SessionKind, SessionOutcome, SessionPhase, SessionProgress, count_u32,
    round_percent,
};
use super::ensure_unique;

/// Number of whitespace-delimited, non-empty tokens in `text`.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// What an autosave tick would store for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveMark {
    pub question_id: QuestionId,
    pub words: usize,
}

/// Per-question line of the submission screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReport {
    pub question_id: QuestionId,
    pub points: u32,
    pub words: usize,
    pub answered: bool,
}

/// Timed free-text test. Grading happens outside the session.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenSession {
    questions: Arc<[WrittenQuestion]>,
    cursor: Cursor,
    responses: BTreeMap<QuestionId, String>,
    countdown: Countdown,
    phase: SessionPhase,
}

impl WrittenSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for no questions, `DuplicateItem` if two
    /// questions share an id, and `ZeroDuration` for a zero countdown.
    pub fn start(
        questions: impl Into<Arc<[WrittenQuestion]>>,
        duration_secs: u32,
    ) -> Result<Self, SessionError> {
        let questions = questions.into();
        let cursor = Cursor::new(questions.len())?;
        ensure_unique(questions.iter().map(WrittenQuestion::id))?;
        let countdown = Countdown::new(duration_secs)?;

        Ok(Self {
            questions,
            cursor,
            responses: BTreeMap::new(),
            countdown,
            phase: SessionPhase::InProgress,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[WrittenQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn current_question(&self) -> &WrittenQuestion {
        &self.questions[self.cursor.index()]
    }

    #[must_use]
    pub fn answer(&self, id: QuestionId) -> &str {
        self.responses.get(&id).map_or("", String::as_str)
    }

    #[must_use]
    pub fn current_answer(&self) -> &str {
        self.answer(self.current_question().id())
    }

    #[must_use]
    pub fn responses(&self) -> &BTreeMap<QuestionId, String> {
        &self.responses
    }

    /// An answer counts once it holds at least one word.
    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        word_count(self.answer(id)) > 0
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.is_answered(q.id()))
            .count()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
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
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            position: self.cursor.position(),
            total: self.cursor.len(),
            answered: self.answered_count(),
            percent: round_percent(self.cursor.position(), self.cursor.len()),
            is_complete: self.is_completed(),
        }
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.is_completed() {
            return Err(InvalidTransition::Completed.into());
        }
        Ok(())
    }

    /// Replace the text stored for question `id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion and
    /// `SessionError::NotFound` for an unknown question.
    pub fn set_answer(&self, id: QuestionId, text: impl Into<String>) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        if !self.questions.iter().any(|q| q.id() == id) {
            return Err(SessionError::NotFound(ItemId::Question(id)));
        }
        let mut next = self.clone();
        next.responses.insert(id, text.into());
        Ok(next)
    }

    /// # Errors
    ///
    /// Same as [`WrittenSession::set_answer`].
    pub fn set_current(&self, text: impl Into<String>) -> Result<Self, SessionError> {
        self.set_answer(self.current_question().id(), text)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion.
    pub fn advance(&self) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        Ok(Self {
            cursor: self.cursor.forward(),
            ..self.clone()
        })
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion.
    pub fn retreat(&self) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        Ok(Self {
            cursor: self.cursor.back(),
            ..self.clone()
        })
    }

    /// One second of the countdown. Reaching zero submits the test.
    #[must_use]
    pub fn tick(&self) -> Self {
        if self.is_completed() {
            return self.clone();
        }
        let countdown = self.countdown.tick();
        let phase = if countdown.is_expired() {
            log::debug!(
                "written test time expired with {}/{} answered",
                self.answered_count(),
                self.questions.len()
            );
            SessionPhase::Completed(CompletionReason::TimeExpired)
        } else {
            SessionPhase::InProgress
        };
        Self {
            countdown,
            phase,
            ..self.clone()
        }
    }

    /// Finish the test; any subset of questions may be unanswered.
    #[must_use]
    pub fn submit(&self) -> Self {
        if self.is_completed() {
            return self.clone();
        }
        Self {
            phase: SessionPhase::Completed(CompletionReason::Submitted),
            ..self.clone()
        }
    }

    /// The draft an autosave tick should surface, if any.
    ///
    /// `None` once the test is completed or while the current answer is blank.
    #[must_use]
    pub fn autosave(&self) -> Option<AutosaveMark> {
        if self.is_completed() {
            return None;
        }
        let question_id = self.current_question().id();
        let words = word_count(self.answer(question_id));
        (words > 0).then_some(AutosaveMark { question_id, words })
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(WrittenQuestion::points).sum()
    }

    /// Points available from the questions that have an answer.
    #[must_use]
    pub fn answered_points(&self) -> u32 {
        self.questions
            .iter()
            .filter(|q| self.is_answered(q.id()))
            .map(WrittenQuestion::points)
            .sum()
    }

    #[must_use]
    pub fn answer_report(&self) -> Vec<AnswerReport> {
        self.questions
            .iter()
            .map(|q| {
                let words = word_count(self.answer(q.id()));
                AnswerReport {
                    question_id: q.id(),
                    points: q.points(),
                    words,
                    answered: words > 0,
                }
            })
            .collect()
    }

    /// Written tests carry no score; `percent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    pub fn outcome(&self) -> Result<SessionOutcome, SessionError> {
        let SessionPhase::Completed(reason) = self.phase else {
            return Err(InvalidTransition::NotCompleted.into());
        };
        Ok(SessionOutcome {
            kind: SessionKind::Written,
            percent: None,
            correct: 0,
            incorrect: 0,
            answered: count_u32(self.answered_count()),
            total: count_u32(self.questions.len()),
            elapsed_secs: Some(self.countdown.elapsed_secs()),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<WrittenQuestion> {
        vec![
            WrittenQuestion::new(QuestionId::new(1), "Explain dynamic programming", 20, "300-400 words")
                .unwrap(),
            WrittenQuestion::new(QuestionId::new(2), "Compare sorting algorithms", 25, "400-500 words")
                .unwrap(),
            WrittenQuestion::new(QuestionId::new(3), "TCP handshake", 10, "200-300 words").unwrap(),
        ]
    }

    #[test]
    fn word_count_ignores_extra_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("  split   into\nthree "), 3);
    }

    #[test]
    fn whitespace_answer_counts_as_unanswered() {
        let s = WrittenSession::start(questions(), 600)
            .unwrap()
            .set_answer(QuestionId::new(1), "   ")
            .unwrap()
            .set_answer(QuestionId::new(2), "merge sort is stable")
            .unwrap();
        assert!(!s.is_answered(QuestionId::new(1)));
        assert!(s.is_answered(QuestionId::new(2)));
        assert_eq!(s.answered_count(), 1);
        assert_eq!(s.answered_points(), 25);
        assert_eq!(s.total_points(), 55);
    }

    #[test]
    fn set_answer_overwrites_and_rejects_unknown() {
        let s = WrittenSession::start(questions(), 600)
            .unwrap()
            .set_current("first")
            .unwrap()
            .set_current("second draft")
            .unwrap();
        assert_eq!(s.responses().len(), 1);
        assert_eq!(s.current_answer(), "second draft");

        let err = s.set_answer(QuestionId::new(42), "x").unwrap_err();
        assert_eq!(err, SessionError::NotFound(ItemId::Question(QuestionId::new(42))));
    }

    #[test]
    fn autosave_only_for_non_empty_current_answer() {
        let s = WrittenSession::start(questions(), 600).unwrap();
        assert_eq!(s.autosave(), None);

        let s = s.set_current("overlapping subproblems").unwrap();
        assert_eq!(
            s.autosave(),
            Some(AutosaveMark {
                question_id: QuestionId::new(1),
                words: 2
            })
        );

        // Moving to an unanswered question stops autosave.
        assert_eq!(s.advance().unwrap().autosave(), None);
        assert_eq!(s.submit().autosave(), None);
    }

    #[test]
    fn submission_allowed_with_nothing_answered() {
        let s = WrittenSession::start(questions(), 600).unwrap().submit();
        let outcome = s.outcome().unwrap();
        assert_eq!(outcome.percent, None);
        assert_eq!(outcome.answered, 0);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.reason, CompletionReason::Submitted);
    }

    #[test]
    fn expiry_forces_completion_and_freezes_answers() {
        let s = WrittenSession::start(questions(), 2)
            .unwrap()
            .set_current("draft")
            .unwrap()
            .tick()
            .tick();
        assert_eq!(s.phase(), SessionPhase::Completed(CompletionReason::TimeExpired));
        assert_eq!(
            s.set_current("late edit").unwrap_err(),
            SessionError::InvalidTransition(InvalidTransition::Completed)
        );
        assert_eq!(s.tick(), s);
        assert_eq!(s.current_answer(), "draft");
    }

    #[test]
    fn answer_report_lists_every_question() {
        let s = WrittenSession::start(questions(), 600)
            .unwrap()
            .set_answer(QuestionId::new(3), "SYN SYN-ACK ACK")
            .unwrap()
            .submit();
        let report = s.answer_report();
        assert_eq!(report.len(), 3);
        assert!(!report[0].answered);
        assert_eq!(report[2].words, 3);
        assert!(report[2].answered);
    }
}
