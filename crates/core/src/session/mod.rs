//! Study session state machines.
//!
//! All three controllers follow `InProgress -> Completed`, with `restart`
//! (where offered) as the only way back. Transitions take `&self` and return
//! the next state.

mod countdown;
mod cursor;
mod error;
mod flashcard;
mod mcq;
mod outcome;
mod written;

use std::collections::BTreeSet;

pub use countdown::Countdown;
pub use cursor::Cursor;
pub use error::{InvalidTransition, ItemId, SessionError};
pub use flashcard::{CardStatus, FlashcardSession, FlashcardSummary};
pub use mcq::{McqRating, McqSession, QuestionReview, Verdict};
pub use outcome::{
    CompletionReason, SessionKind, SessionOutcome, SessionPhase, SessionProgress, round_percent,
};
pub use written::{AnswerReport, AutosaveMark, WrittenSession, word_count};

fn ensure_unique<I>(ids: impl IntoIterator<Item = I>) -> Result<(), SessionError>
where
    I: Into<ItemId> + Ord + Copy,
{
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SessionError::DuplicateItem(id.into()));
        }
    }
    Ok(())
}
