use study_core::session::{
    AutosaveMark, FlashcardSession, McqSession, SessionError, SessionKind, SessionOutcome,
    SessionProgress, WrittenSession,
};

use crate::error::RunnerError;

/// A user action routed to the session owned by a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Next,
    Previous,
    /// Select an option on the current MCQ question.
    Select(usize),
    /// Replace the answer to the current written question.
    Write(String),
    Flip,
    /// Self-grade the current flashcard.
    Grade(bool),
    Submit,
}

impl SessionCommand {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Next => "next",
            SessionCommand::Previous => "previous",
            SessionCommand::Select(_) => "select",
            SessionCommand::Write(_) => "write",
            SessionCommand::Flip => "flip",
            SessionCommand::Grade(_) => "grade",
            SessionCommand::Submit => "submit",
        }
    }
}

/// Written tests report the points of the questions that have an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsTally {
    pub answered: u32,
    pub total: u32,
}

/// A session controller a runner can drive.
pub trait SessionMachine: Clone + Send + Sync + 'static {
    fn kind(&self) -> SessionKind;

    /// Apply one user command, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Unsupported` for commands foreign to this kind of
    /// session and `RunnerError::Session` for rejected transitions.
    fn apply(&self, command: &SessionCommand) -> Result<Self, RunnerError>;

    /// Whether the runner should feed one-second ticks.
    fn is_timed(&self) -> bool;

    fn tick(&self) -> Self;

    /// Whether the runner should feed autosave ticks.
    fn autosaves(&self) -> bool {
        false
    }

    fn autosave(&self) -> Option<AutosaveMark> {
        None
    }

    fn is_completed(&self) -> bool;

    fn progress(&self) -> SessionProgress;

    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` before completion.
    fn outcome(&self) -> Result<SessionOutcome, SessionError>;

    fn points(&self) -> Option<PointsTally> {
        None
    }

    /// A fresh pass over the same items, if the session offers one.
    fn restarted(&self) -> Option<Self> {
        None
    }
}

fn unsupported(kind: SessionKind, command: &SessionCommand) -> RunnerError {
    RunnerError::Unsupported {
        kind,
        command: command.name(),
    }
}

impl SessionMachine for McqSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Mcq
    }

    fn apply(&self, command: &SessionCommand) -> Result<Self, RunnerError> {
        let next = match command {
            SessionCommand::Next => self.advance()?,
            SessionCommand::Previous => self.retreat()?,
            SessionCommand::Select(option) => self.select_current(*option)?,
            SessionCommand::Submit => self.submit(),
            other => return Err(unsupported(self.kind(), other)),
        };
        Ok(next)
    }

    fn is_timed(&self) -> bool {
        true
    }

    fn tick(&self) -> Self {
        McqSession::tick(self)
    }

    fn is_completed(&self) -> bool {
        McqSession::is_completed(self)
    }

    fn progress(&self) -> SessionProgress {
        McqSession::progress(self)
    }

    fn outcome(&self) -> Result<SessionOutcome, SessionError> {
        McqSession::outcome(self)
    }

    fn restarted(&self) -> Option<Self> {
        Some(self.restart())
    }
}

impl SessionMachine for WrittenSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Written
    }

    fn apply(&self, command: &SessionCommand) -> Result<Self, RunnerError> {
        let next = match command {
            SessionCommand::Next => self.advance()?,
            SessionCommand::Previous => self.retreat()?,
            SessionCommand::Write(text) => self.set_current(text.as_str())?,
            SessionCommand::Submit => self.submit(),
            other => return Err(unsupported(self.kind(), other)),
        };
        Ok(next)
    }

    fn is_timed(&self) -> bool {
        true
    }

    fn tick(&self) -> Self {
        WrittenSession::tick(self)
    }

    fn autosaves(&self) -> bool {
        true
    }

    fn autosave(&self) -> Option<AutosaveMark> {
        WrittenSession::autosave(self)
    }

    fn is_completed(&self) -> bool {
        WrittenSession::is_completed(self)
    }

    fn progress(&self) -> SessionProgress {
        WrittenSession::progress(self)
    }

    fn outcome(&self) -> Result<SessionOutcome, SessionError> {
        WrittenSession::outcome(self)
    }

    fn points(&self) -> Option<PointsTally> {
        Some(PointsTally {
            answered: self.answered_points(),
            total: self.total_points(),
        })
    }
}

impl SessionMachine for FlashcardSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Flashcard
    }

    fn apply(&self, command: &SessionCommand) -> Result<Self, RunnerError> {
        let next = match command {
            SessionCommand::Next => FlashcardSession::next(self)?,
            SessionCommand::Previous => self.previous()?,
            SessionCommand::Flip => self.flip()?,
            SessionCommand::Grade(correct) => self.respond(*correct)?,
            other => return Err(unsupported(self.kind(), other)),
        };
        Ok(next)
    }

    fn is_timed(&self) -> bool {
        false
    }

    fn tick(&self) -> Self {
        self.clone()
    }

    fn is_completed(&self) -> bool {
        FlashcardSession::is_completed(self)
    }

    fn progress(&self) -> SessionProgress {
        FlashcardSession::progress(self)
    }

    fn outcome(&self) -> Result<SessionOutcome, SessionError> {
        FlashcardSession::outcome(self)
    }

    fn restarted(&self) -> Option<Self> {
        Some(self.restart())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use study_core::model::{CardId, Difficulty, FlashCard, McqQuestion, QuestionId, WrittenQuestion};

    fn mcq() -> McqSession {
        let questions = vec![
            McqQuestion::new(QuestionId::new(1), "Q1", vec!["a".into(), "b".into()], 1, "").unwrap(),
            McqQuestion::new(QuestionId::new(2), "Q2", vec!["a".into(), "b".into()], 0, "").unwrap(),
        ];
        McqSession::start(questions, 60).unwrap()
    }

    #[test]
    fn mcq_rejects_flashcard_commands() {
        let err = mcq().apply(&SessionCommand::Flip).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Unsupported {
                kind: SessionKind::Mcq,
                command: "flip"
            }
        ));
    }

    #[test]
    fn mcq_select_then_submit_completes() {
        let session = mcq()
            .apply(&SessionCommand::Select(1))
            .and_then(|s| s.apply(&SessionCommand::Submit))
            .unwrap();
        assert!(SessionMachine::is_completed(&session));
        assert_eq!(SessionMachine::outcome(&session).unwrap().percent, Some(50));
    }

    #[test]
    fn written_reports_points_of_answered_questions() {
        let questions = vec![
            WrittenQuestion::new(QuestionId::new(1), "Explain", 20, "100 words").unwrap(),
            WrittenQuestion::new(QuestionId::new(2), "Compare", 30, "100 words").unwrap(),
        ];
        let session = WrittenSession::start(questions, 60)
            .unwrap()
            .apply(&SessionCommand::Write("an answer".into()))
            .unwrap();
        assert_eq!(
            session.points(),
            Some(PointsTally {
                answered: 20,
                total: 50
            })
        );
        assert!(session.restarted().is_none());
        assert!(SessionMachine::autosave(&session).is_some());
    }

    #[test]
    fn flashcard_grading_requires_flip() {
        let cards = vec![FlashCard::new(CardId::new(1), "front", "back", Difficulty::Easy).unwrap()];
        let session = FlashcardSession::start(cards).unwrap();
        assert!(matches!(
            session.apply(&SessionCommand::Grade(true)),
            Err(RunnerError::Session(_))
        ));
        let done = session
            .apply(&SessionCommand::Flip)
            .and_then(|s| s.apply(&SessionCommand::Grade(true)))
            .unwrap();
        assert!(SessionMachine::is_completed(&done));
        assert!(!done.is_timed());
    }
}
