use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::catalog::CatalogError;
use crate::model::flashcard::Difficulty;
use crate::model::ids::ResultId;
use crate::session::{SessionKind, round_percent};

/// Activity a result was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Mcq,
    Written,
    Flashcard,
}

impl ResultKind {
    pub const ALL: [ResultKind; 3] = [ResultKind::Mcq, ResultKind::Written, ResultKind::Flashcard];

    /// Plural label used on the analytics page.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ResultKind::Mcq => "MCQ Tests",
            ResultKind::Written => "Written Tests",
            ResultKind::Flashcard => "Flash Cards",
        }
    }
}

impl From<SessionKind> for ResultKind {
    fn from(kind: SessionKind) -> Self {
        match kind {
            SessionKind::Mcq => ResultKind::Mcq,
            SessionKind::Written => ResultKind::Written,
            SessionKind::Flashcard => ResultKind::Flashcard,
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResultKind::Mcq => "mcq",
            ResultKind::Written => "written",
            ResultKind::Flashcard => "flashcard",
        })
    }
}

/// Badge shown next to a recorded score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl ScoreBand {
    #[must_use]
    pub fn for_score(score: u8) -> Self {
        match score {
            90.. => ScoreBand::Excellent,
            80..=89 => ScoreBand::Good,
            60..=79 => ScoreBand::Fair,
            _ => ScoreBand::NeedsWork,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::NeedsWork => "Needs Work",
        }
    }
}

/// A completed activity as stored in the results history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: ResultId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub subject: String,
    /// Score in percent, `0..=max_score`.
    pub score: u8,
    pub max_score: u8,
    #[serde(rename = "date")]
    pub completed_at: DateTime<Utc>,
    /// Allotted duration in minutes; zero for untimed activities.
    pub duration: u32,
    pub questions_total: u32,
    pub questions_correct: u32,
    pub difficulty: Difficulty,
    /// Seconds actually spent.
    pub time_spent: u32,
    /// Written answers not graded yet; `score` holds the share of points attempted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending_grading: bool,
}

impl TestResult {
    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.score)
    }

    /// `questions_correct / questions_total` in percent, `None` when nothing was asked.
    #[must_use]
    pub fn accuracy_percent(&self) -> Option<u8> {
        (self.questions_total > 0).then(|| {
            round_percent(
                self.questions_correct as usize,
                self.questions_total as usize,
            )
        })
    }

    /// Share of the allotted time left unused, `None` for untimed activities.
    #[must_use]
    pub fn time_efficiency_percent(&self) -> Option<u8> {
        let allotted = u64::from(self.duration) * 60;
        if allotted == 0 {
            return None;
        }
        let left = allotted.saturating_sub(u64::from(self.time_spent));
        Some(round_percent(
            usize::try_from(left).unwrap_or(usize::MAX),
            usize::try_from(allotted).unwrap_or(usize::MAX),
        ))
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the score exceeds its maximum (or 100), or more
    /// answers are correct than were asked.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.max_score > 100 || self.score > self.max_score {
            return Err(CatalogError::ScoreOutOfRange {
                id: self.id,
                score: self.score,
                max_score: self.max_score,
            });
        }
        if self.questions_correct > self.questions_total {
            return Err(CatalogError::CorrectExceedsTotal {
                id: self.id,
                correct: self.questions_correct,
                total: self.questions_total,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bands_follow_thresholds() {
        assert_eq!(ScoreBand::for_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(90), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(89), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(80), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(60), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(59), ScoreBand::NeedsWork);
        assert_eq!(ScoreBand::for_score(0).label(), "Needs Work");
    }

    #[test]
    fn result_kind_maps_from_session_kind() {
        assert_eq!(ResultKind::from(SessionKind::Flashcard), ResultKind::Flashcard);
        assert_eq!(ResultKind::Mcq.label(), "MCQ Tests");
    }

    fn result(score: u8, correct: u32, total: u32) -> TestResult {
        TestResult {
            id: ResultId::new(1),
            title: "Algorithm Analysis".into(),
            kind: ResultKind::Mcq,
            subject: "Algorithms".into(),
            score,
            max_score: 100,
            completed_at: crate::time::fixed_now(),
            duration: 45,
            questions_total: total,
            questions_correct: correct,
            difficulty: Difficulty::Medium,
            time_spent: 42 * 60,
            pending_grading: false,
        }
    }

    #[test]
    fn accuracy_and_time_efficiency() {
        let r = result(85, 26, 30);
        assert_eq!(r.accuracy_percent(), Some(87));
        assert_eq!(r.time_efficiency_percent(), Some(7));

        let untimed = TestResult {
            duration: 0,
            ..result(0, 0, 0)
        };
        assert_eq!(untimed.accuracy_percent(), None);
        assert_eq!(untimed.time_efficiency_percent(), None);

        let overtime = TestResult {
            time_spent: 50 * 60,
            ..result(85, 26, 30)
        };
        assert_eq!(overtime.time_efficiency_percent(), Some(0));
    }

    #[test]
    fn validation_rejects_impossible_records() {
        assert!(result(100, 5, 5).validate().is_ok());
        assert!(matches!(
            result(250, 5, 5).validate(),
            Err(CatalogError::ScoreOutOfRange { score: 250, .. })
        ));
        assert!(matches!(
            TestResult {
                max_score: 120,
                ..result(110, 5, 5)
            }
            .validate(),
            Err(CatalogError::ScoreOutOfRange { .. })
        ));
        assert!(matches!(
            result(80, 9, 5).validate(),
            Err(CatalogError::CorrectExceedsTotal { correct: 9, total: 5, .. })
        ));
    }
}
