use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{McqQuestion, QuestionId};

use super::countdown::Countdown;
use super::cursor::Cursor;
use super::error::{InvalidTransition, ItemId, SessionError};
use super::outcome::{
    CompletionReason, SessionKind, SessionOutcome, SessionPhase, SessionProgress, count_u32,
    round_percent,
};
use super::ensure_unique;

//
// ─── REVIEW TYPES ──────────────────────────────────────────────────────────────
//

/// How a single question fared once the test is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

/// Per-question line of the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub selected: Option<usize>,
    pub correct: usize,
    pub verdict: Verdict,
}

/// Headline rating of an MCQ score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McqRating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl McqRating {
    #[must_use]
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => McqRating::Excellent,
            60..=79 => McqRating::Good,
            _ => McqRating::NeedsImprovement,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            McqRating::Excellent => "Excellent",
            McqRating::Good => "Good",
            McqRating::NeedsImprovement => "Needs Improvement",
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Timed multiple-choice test.
///
/// Every transition returns a new value; `self` is never modified, so a
/// rejected call leaves the caller's state exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct McqSession {
    questions: Arc<[McqQuestion]>,
    cursor: Cursor,
    responses: BTreeMap<QuestionId, usize>,
    countdown: Countdown,
    phase: SessionPhase,
}

impl McqSession {
    /// Start a test over `questions` with a countdown of `duration_secs`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for no questions, `DuplicateItem` if two
    /// questions share an id, and `ZeroDuration` for a zero countdown.
    pub fn start(
        questions: impl Into<Arc<[McqQuestion]>>,
        duration_secs: u32,
    ) -> Result<Self, SessionError> {
        let questions = questions.into();
        let cursor = Cursor::new(questions.len())?;
        ensure_unique(questions.iter().map(McqQuestion::id))?;
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
    pub fn questions(&self) -> &[McqQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn current_question(&self) -> &McqQuestion {
        &self.questions[self.cursor.index()]
    }

    #[must_use]
    pub fn responses(&self) -> &BTreeMap<QuestionId, usize> {
        &self.responses
    }

    #[must_use]
    pub fn response(&self, id: QuestionId) -> Option<usize> {
        self.responses.get(&id).copied()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    #[must_use]
    pub fn countdown(&self) -> Countdown {
        self.countdown
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
            answered: self.responses.len(),
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

    fn ensure_completed(&self) -> Result<(), SessionError> {
        if !self.is_completed() {
            return Err(InvalidTransition::NotCompleted.into());
        }
        Ok(())
    }

    /// Record `option` for question `id`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::Completed` after completion,
    /// `SessionError::NotFound` for an unknown question, and
    /// `InvalidTransition::OptionOutOfRange` for a bad option index.
    pub fn select_answer(&self, id: QuestionId, option: usize) -> Result<Self, SessionError> {
        self.ensure_in_progress()?;
        let question = self
            .questions
            .iter()
            .find(|q| q.id() == id)
            .ok_or(SessionError::NotFound(ItemId::Question(id)))?;
        if option >= question.option_count() {
            return Err(InvalidTransition::OptionOutOfRange {
                question: id,
                index: option,
                count: question.option_count(),
            }
            .into());
        }

        let mut next = self.clone();
        next.responses.insert(id, option);
        Ok(next)
    }

    /// Answer whichever question the cursor points at.
    ///
    /// # Errors
    ///
    /// Same as [`McqSession::select_answer`].
    pub fn select_current(&self, option: usize) -> Result<Self, SessionError> {
        self.select_answer(self.current_question().id(), option)
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
    /// Ticking a completed session changes nothing.
    #[must_use]
    pub fn tick(&self) -> Self {
        if self.is_completed() {
            return self.clone();
        }
        let countdown = self.countdown.tick();
        let phase = if countdown.is_expired() {
            log::debug!(
                "mcq time expired with {}/{} answered",
                self.responses.len(),
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

    /// Finish the test. Submitting twice keeps the first completion.
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

    /// Retake: same questions, fresh countdown, no answers.
    #[must_use]
    pub fn restart(&self) -> Self {
        Self {
            questions: Arc::clone(&self.questions),
            cursor: self.cursor.reset(),
            responses: BTreeMap::new(),
            countdown: self.countdown.reset(),
            phase: SessionPhase::InProgress,
        }
    }

    fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.response(q.id()).is_some_and(|r| q.is_correct(r)))
            .count()
    }

    /// Percentage of questions answered correctly; unanswered ones count as wrong.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    pub fn score(&self) -> Result<u8, SessionError> {
        self.ensure_completed()?;
        Ok(round_percent(self.correct_count(), self.questions.len()))
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    pub fn rating(&self) -> Result<McqRating, SessionError> {
        self.score().map(McqRating::for_score)
    }

    /// Per-question verdicts in question order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    pub fn review(&self) -> Result<Vec<QuestionReview>, SessionError> {
        self.ensure_completed()?;
        Ok(self
            .questions
            .iter()
            .map(|q| {
                let selected = self.response(q.id());
                let verdict = match selected {
                    None => Verdict::Unanswered,
                    Some(r) if q.is_correct(r) => Verdict::Correct,
                    Some(_) => Verdict::Incorrect,
                };
                QuestionReview {
                    question_id: q.id(),
                    selected,
                    correct: q.correct(),
                    verdict,
                }
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    pub fn outcome(&self) -> Result<SessionOutcome, SessionError> {
        let SessionPhase::Completed(reason) = self.phase else {
            return Err(InvalidTransition::NotCompleted.into());
        };
        let correct = self.correct_count();
        Ok(SessionOutcome {
            kind: SessionKind::Mcq,
            percent: Some(self.score()?),
            correct: count_u32(correct),
            incorrect: count_u32(self.questions.len() - correct),
            answered: count_u32(self.responses.len()),
            total: count_u32(self.questions.len()),
            elapsed_secs: Some(self.countdown.elapsed_secs()),
            reason,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, correct: usize) -> McqQuestion {
        McqQuestion::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            "",
        )
        .unwrap()
    }

    fn five_questions() -> Vec<McqQuestion> {
        vec![
            question(1, 1),
            question(2, 1),
            question(3, 1),
            question(4, 1),
            question(5, 3),
        ]
    }

    #[test]
    fn start_initialises_state() {
        let s = McqSession::start(five_questions(), 2700).unwrap();
        assert_eq!(s.cursor().index(), 0);
        assert!(s.responses().is_empty());
        assert_eq!(s.remaining_secs(), 2700);
        assert_eq!(s.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn start_rejects_empty_duplicate_and_zero_duration() {
        assert_eq!(
            McqSession::start(Vec::new(), 10).unwrap_err(),
            SessionError::Empty
        );
        assert_eq!(
            McqSession::start(vec![question(1, 0), question(1, 1)], 10).unwrap_err(),
            SessionError::DuplicateItem(ItemId::Question(QuestionId::new(1)))
        );
        assert_eq!(
            McqSession::start(five_questions(), 0).unwrap_err(),
            SessionError::ZeroDuration
        );
    }

    #[test]
    fn scenario_three_of_five_scores_sixty() {
        let mut s = McqSession::start(five_questions(), 600).unwrap();
        for (id, option) in [(1, 1), (2, 0), (3, 1), (5, 3)] {
            s = s.select_answer(QuestionId::new(id), option).unwrap();
        }
        let s = s.submit();
        assert_eq!(s.score().unwrap(), 60);
        assert_eq!(s.rating().unwrap(), McqRating::Good);

        let review = s.review().unwrap();
        assert_eq!(review[0].verdict, Verdict::Correct);
        assert_eq!(review[1].verdict, Verdict::Incorrect);
        assert_eq!(review[3].verdict, Verdict::Unanswered);
        assert_eq!(review[3].selected, None);
    }

    #[test]
    fn reselecting_overwrites() {
        let s = McqSession::start(five_questions(), 600)
            .unwrap()
            .select_answer(QuestionId::new(1), 0)
            .unwrap()
            .select_answer(QuestionId::new(1), 1)
            .unwrap();
        assert_eq!(s.responses().len(), 1);
        assert_eq!(s.response(QuestionId::new(1)), Some(1));
    }

    #[test]
    fn unknown_question_and_bad_option_leave_state_untouched() {
        let s = McqSession::start(five_questions(), 600).unwrap();
        let before = s.clone();

        let err = s.select_answer(QuestionId::new(99), 0).unwrap_err();
        assert_eq!(err, SessionError::NotFound(ItemId::Question(QuestionId::new(99))));

        let err = s.select_answer(QuestionId::new(1), 4).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition(InvalidTransition::OptionOutOfRange { index: 4, count: 4, .. })
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn navigation_clamps_at_boundaries() {
        let s = McqSession::start(five_questions(), 600).unwrap();
        assert_eq!(s.retreat().unwrap().cursor().index(), 0);

        let mut s = s;
        for _ in 0..10 {
            s = s.advance().unwrap();
        }
        assert_eq!(s.cursor().index(), 4);
        assert_eq!(s.current_question().id(), QuestionId::new(5));
        assert_eq!(s.progress().percent, 100);
    }

    #[test]
    fn completed_session_rejects_mutation() {
        let s = McqSession::start(five_questions(), 600).unwrap().submit();
        let completed = SessionError::InvalidTransition(InvalidTransition::Completed);
        assert_eq!(s.advance().unwrap_err(), completed);
        assert_eq!(s.retreat().unwrap_err(), completed);
        assert_eq!(s.select_answer(QuestionId::new(1), 1).unwrap_err(), completed);
    }

    #[test]
    fn score_requires_completion() {
        let s = McqSession::start(five_questions(), 600).unwrap();
        assert_eq!(
            s.score().unwrap_err(),
            SessionError::InvalidTransition(InvalidTransition::NotCompleted)
        );
    }

    #[test]
    fn one_second_test_expires_on_first_tick() {
        let s = McqSession::start(five_questions(), 1).unwrap().tick();
        assert_eq!(s.remaining_secs(), 0);
        assert_eq!(
            s.phase(),
            SessionPhase::Completed(CompletionReason::TimeExpired)
        );
        assert_eq!(s.score().unwrap(), 0);
    }

    #[test]
    fn submit_and_tick_after_completion_are_idempotent() {
        let s = McqSession::start(five_questions(), 2)
            .unwrap()
            .select_answer(QuestionId::new(1), 1)
            .unwrap()
            .submit();
        let again = s.submit().tick().tick();
        assert_eq!(again, s);
        assert_eq!(
            again.phase(),
            SessionPhase::Completed(CompletionReason::Submitted)
        );
    }

    #[test]
    fn outcome_reports_elapsed_time() {
        let s = McqSession::start(five_questions(), 60)
            .unwrap()
            .tick()
            .tick()
            .select_current(1)
            .unwrap()
            .submit();
        let outcome = s.outcome().unwrap();
        assert_eq!(outcome.percent, Some(20));
        assert_eq!(outcome.correct, 1);
        assert_eq!(outcome.incorrect, 4);
        assert_eq!(outcome.answered, 1);
        assert_eq!(outcome.elapsed_secs, Some(2));
    }

    #[test]
    fn restart_resets_answers_and_timer() {
        let s = McqSession::start(five_questions(), 30)
            .unwrap()
            .select_answer(QuestionId::new(2), 1)
            .unwrap()
            .advance()
            .unwrap()
            .tick()
            .submit()
            .restart();
        assert_eq!(s.phase(), SessionPhase::InProgress);
        assert_eq!(s.cursor().index(), 0);
        assert!(s.responses().is_empty());
        assert_eq!(s.remaining_secs(), 30);
        assert_eq!(s.questions().len(), 5);
    }
}
