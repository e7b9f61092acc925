use serde::{Deserialize, Serialize};
use std::fmt;

/// Which session controller produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Mcq,
    Written,
    Flashcard,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionKind::Mcq => "mcq",
            SessionKind::Written => "written",
            SessionKind::Flashcard => "flashcard",
        })
    }
}

/// Why a session reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    Submitted,
    TimeExpired,
    Exhausted,
}

/// Lifecycle of a started session. `Idle` is the absence of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Completed(CompletionReason),
}

impl SessionPhase {
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, SessionPhase::Completed(_))
    }
}

/// Derived summary of a completed session.
///
/// `percent` is the score for MCQ sessions, the accuracy for flashcard
/// sessions, and `None` for written sessions which are graded elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub kind: SessionKind,
    pub percent: Option<u8>,
    pub correct: u32,
    pub incorrect: u32,
    pub answered: u32,
    pub total: u32,
    /// Seconds measured by the session itself (timed sessions only).
    pub elapsed_secs: Option<u32>,
    pub reason: CompletionReason,
}

/// Progress counters for the progress bar above a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub percent: u8,
    pub is_complete: bool,
}

/// `part / whole` as a percentage rounded half up, clamped to `0..=100`.
/// Returns 0 when `whole` is zero.
#[must_use]
pub fn round_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u64;
    let whole = whole as u64;
    let rounded = (part * 200 + whole) / (whole * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

pub(crate) fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
