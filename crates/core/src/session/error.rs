use std::fmt;
use thiserror::Error;

use crate::model::{CardId, QuestionId};

/// Identifier of any item a session can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemId {
    Question(QuestionId),
    Card(CardId),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Question(id) => write!(f, "question {id}"),
            ItemId::Card(id) => write!(f, "card {id}"),
        }
    }
}

impl From<QuestionId> for ItemId {
    fn from(id: QuestionId) -> Self {
        ItemId::Question(id)
    }
}

impl From<CardId> for ItemId {
    fn from(id: CardId) -> Self {
        ItemId::Card(id)
    }
}

/// A call that the current session state does not allow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidTransition {
    #[error("session already completed")]
    Completed,

    #[error("session has not completed yet")]
    NotCompleted,

    #[error("card must be flipped before responding")]
    NotFlipped,

    #[error("option {index} is out of range for question {question} ({count} options)")]
    OptionOutOfRange {
        question: QuestionId,
        index: usize,
        count: usize,
    },
}

/// Errors emitted by session transitions.
///
/// A transition that returns an error leaves the previous state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] InvalidTransition),

    #[error("{0} is not part of this session")]
    NotFound(ItemId),

    #[error("no items available for session")]
    Empty,

    #[error("{0} appears more than once")]
    DuplicateItem(ItemId),

    #[error("timed session needs a duration of at least one second")]
    ZeroDuration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_item() {
        let err = SessionError::NotFound(QuestionId::new(9).into());
        assert_eq!(err.to_string(), "question 9 is not part of this session");
    }

    #[test]
    fn invalid_transition_wraps() {
        let err: SessionError = InvalidTransition::NotFlipped.into();
        assert_eq!(
            err.to_string(),
            "invalid transition: card must be flipped before responding"
        );
    }
}
