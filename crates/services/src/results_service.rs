use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;

use storage::repository::{ResultDraft, ResultRepository};
use study_core::Clock;
use study_core::model::{
    Difficulty, ExamTemplate, FlashcardSet, ResultId, ResultKind, ScoreBand, TestResult,
};

use crate::error::ResultsError;
use crate::runner::SessionReport;

/// Average score above which the overview reports the target as met.
pub const TARGET_SCORE: u8 = 75;

/// How far back a result listing reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Week,
    Month,
    ThreeMonths,
}

impl Period {
    #[must_use]
    pub fn days(self) -> Option<i64> {
        match self {
            Period::All => None,
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::ThreeMonths => Some(90),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Period::All => "all",
            Period::Week => "week",
            Period::Month => "month",
            Period::ThreeMonths => "3months",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Period::All),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "3months" => Ok(Period::ThreeMonths),
            other => Err(ResultsError::UnknownPeriod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    /// Exact subject to keep; `None` keeps every subject.
    pub subject: Option<String>,
    pub period: Period,
}

impl ResultFilter {
    fn keeps(&self, result: &TestResult, now: chrono::DateTime<chrono::Utc>) -> bool {
        if self.subject.as_ref().is_some_and(|s| *s != result.subject) {
            return false;
        }
        match self.period.days() {
            Some(days) => now - result.completed_at <= Duration::days(days),
            None => true,
        }
    }
}

/// Catalog details stored alongside a session report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultContext {
    pub title: String,
    pub subject: String,
    pub difficulty: Difficulty,
    /// Allotted minutes; untimed activities use the time actually spent.
    pub duration_minutes: Option<u32>,
}

impl ResultContext {
    #[must_use]
    pub fn from_exam(exam: &ExamTemplate) -> Self {
        Self {
            title: exam.title.clone(),
            subject: exam.subject.clone(),
            difficulty: exam.difficulty,
            duration_minutes: Some(exam.duration),
        }
    }

    #[must_use]
    pub fn from_deck(deck: &FlashcardSet) -> Self {
        Self {
            title: format!("{} Study Session", deck.title),
            subject: deck.subject.clone(),
            difficulty: deck.difficulty,
            duration_minutes: None,
        }
    }
}

/// Averages skip results still pending grading; counts include them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: ResultKind,
    pub count: usize,
    pub average: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSummary {
    pub subject: String,
    pub count: usize,
    pub average: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsOverview {
    pub count: usize,
    /// Results left out of every average and of the target check.
    pub pending_grading: usize,
    pub average_score: u8,
    pub above_target: bool,
    pub total_hours: u32,
    pub by_kind: Vec<KindSummary>,
    /// In order of the most recent result per subject.
    pub by_subject: Vec<SubjectSummary>,
}

/// One stored result with the figures of its detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDetail {
    pub result: TestResult,
    /// `None` while the result is pending grading.
    pub band: Option<ScoreBand>,
    pub accuracy_percent: Option<u8>,
    pub time_efficiency_percent: Option<u8>,
}

impl From<TestResult> for ResultDetail {
    fn from(result: TestResult) -> Self {
        Self {
            band: (!result.pending_grading).then(|| result.band()),
            accuracy_percent: result.accuracy_percent(),
            time_efficiency_percent: result.time_efficiency_percent(),
            result,
        }
    }
}

fn average(scores: impl IntoIterator<Item = u8>) -> Option<u8> {
    let (sum, count) = scores
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), s| (sum + u64::from(s), count + 1));
    if count == 0 {
        return None;
    }
    let rounded = (sum * 2 + count) / (count * 2);
    Some(u8::try_from(rounded.min(100)).unwrap_or(100))
}

/// Records session reports and summarises the result history.
#[derive(Clone)]
pub struct ResultsService {
    clock: Clock,
    results: Arc<dyn ResultRepository>,
}

impl ResultsService {
    #[must_use]
    pub fn new(clock: Clock, results: Arc<dyn ResultRepository>) -> Self {
        Self { clock, results }
    }

    /// Store a completed session.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::Storage` if the result cannot be stored.
    pub async fn record(
        &self,
        report: &SessionReport,
        context: &ResultContext,
    ) -> Result<ResultId, ResultsError> {
        let kind = ResultKind::from(report.kind);
        let questions_correct = match kind {
            ResultKind::Written => report.answered,
            ResultKind::Mcq | ResultKind::Flashcard => report.correct,
        };
        let draft = ResultDraft {
            title: context.title.clone(),
            kind,
            subject: context.subject.clone(),
            score: report.score(),
            completed_at: report.completed_at,
            duration_minutes: context
                .duration_minutes
                .unwrap_or_else(|| report.time_spent_secs.div_ceil(60)),
            questions_total: report.total,
            questions_correct,
            difficulty: context.difficulty,
            time_spent_secs: report.time_spent_secs,
            pending_grading: kind == ResultKind::Written,
        };
        let score = draft.score;
        let id = self.results.append_result(draft).await?;
        log::info!("recorded {kind} result {id} for {} ({score}%)", context.title);
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `ResultsError::Storage` if the result is missing.
    pub async fn get(&self, id: ResultId) -> Result<TestResult, ResultsError> {
        Ok(self.results.get_result(id).await?)
    }

    /// # Errors
    ///
    /// Returns `ResultsError::Storage` if the result is missing.
    pub async fn detail(&self, id: ResultId) -> Result<ResultDetail, ResultsError> {
        Ok(self.get(id).await?.into())
    }

    /// Matching results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::Storage` if repository access fails.
    pub async fn list(&self, filter: &ResultFilter) -> Result<Vec<TestResult>, ResultsError> {
        let now = self.clock.now();
        let results = self.results.list_results().await?;
        Ok(results
            .into_iter()
            .filter(|r| filter.keeps(r, now))
            .collect())
    }

    /// Distinct subjects across every result, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::Storage` if repository access fails.
    pub async fn subjects(&self) -> Result<Vec<String>, ResultsError> {
        let results = self.results.list_results().await?;
        let mut subjects: Vec<String> = Vec::new();
        for result in results {
            if !subjects.contains(&result.subject) {
                subjects.push(result.subject);
            }
        }
        Ok(subjects)
    }

    /// # Errors
    ///
    /// Returns `ResultsError::Storage` if repository access fails.
    pub async fn overview(&self, filter: &ResultFilter) -> Result<ResultsOverview, ResultsError> {
        let results = self.list(filter).await?;
        let graded: Vec<&TestResult> = results.iter().filter(|r| !r.pending_grading).collect();

        let total_score: u64 = graded.iter().map(|r| u64::from(r.score)).sum();
        let above_target = total_score > u64::from(TARGET_SCORE) * graded.len() as u64;
        let total_secs: u64 = results.iter().map(|r| u64::from(r.time_spent)).sum();
        let total_hours = u32::try_from((total_secs + 1800) / 3600).unwrap_or(u32::MAX);

        let by_kind = ResultKind::ALL
            .into_iter()
            .map(|kind| KindSummary {
                kind,
                count: results.iter().filter(|r| r.kind == kind).count(),
                average: average(graded.iter().filter(|r| r.kind == kind).map(|r| r.score)),
            })
            .collect();

        let mut by_subject: Vec<SubjectSummary> = Vec::new();
        for result in &results {
            if by_subject.iter().any(|s| s.subject == result.subject) {
                continue;
            }
            by_subject.push(SubjectSummary {
                subject: result.subject.clone(),
                count: results.iter().filter(|r| r.subject == result.subject).count(),
                average: average(
                    graded
                        .iter()
                        .filter(|r| r.subject == result.subject)
                        .map(|r| r.score),
                ),
            });
        }

        Ok(ResultsOverview {
            count: results.len(),
            pending_grading: results.len() - graded.len(),
            average_score: average(graded.iter().map(|r| r.score)).unwrap_or(0),
            above_target,
            total_hours,
            by_kind,
            by_subject,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use storage::repository::InMemoryRepository;
    use storage::seed::sample_catalog;
    use study_core::session::{CompletionReason, SessionKind};

    fn service_at(year: i32, month: u32, day: u32) -> ResultsService {
        let repo = InMemoryRepository::from_catalog(sample_catalog().unwrap()).unwrap();
        let now = Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap();
        ResultsService::new(Clock::fixed(now), Arc::new(repo))
    }

    fn report(kind: SessionKind, percent: Option<u8>) -> SessionReport {
        let at = Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap();
        SessionReport {
            kind,
            percent,
            correct: 3,
            incorrect: 1,
            answered: 4,
            total: 5,
            time_spent_secs: 125,
            started_at: at,
            completed_at: at,
            reason: CompletionReason::Submitted,
            answered_points: None,
            total_points: None,
        }
    }

    fn context() -> ResultContext {
        ResultContext {
            title: "Graphs".into(),
            subject: "Algorithms".into(),
            difficulty: Difficulty::Hard,
            duration_minutes: None,
        }
    }

    #[test]
    fn periods_parse_from_filter_names() {
        assert_eq!("3months".parse::<Period>().unwrap(), Period::ThreeMonths);
        assert_eq!(" Week ".parse::<Period>().unwrap(), Period::Week);
        assert!(matches!(
            "year".parse::<Period>(),
            Err(ResultsError::UnknownPeriod(_))
        ));
    }

    #[tokio::test]
    async fn week_filter_includes_boundary_day() {
        let svc = service_at(2024, 1, 20);
        let filter = ResultFilter {
            period: Period::Week,
            ..ResultFilter::default()
        };
        let listed = svc.list(&filter).await.unwrap();
        let scores: Vec<u8> = listed.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![85, 78, 92]);
    }

    #[tokio::test]
    async fn subject_filter_is_exact() {
        let svc = service_at(2024, 1, 20);
        let filter = ResultFilter {
            subject: Some("Databases".into()),
            period: Period::All,
        };
        let listed = svc.list(&filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Database Design");
    }

    #[tokio::test]
    async fn overview_matches_sample_history() {
        let svc = service_at(2024, 1, 20);
        let overview = svc.overview(&ResultFilter::default()).await.unwrap();
        assert_eq!(overview.count, 5);
        assert_eq!(overview.average_score, 83);
        assert!(overview.above_target);
        assert_eq!(overview.total_hours, 5);
        assert_eq!(
            overview.by_kind[0],
            KindSummary {
                kind: ResultKind::Mcq,
                count: 2,
                average: Some(79),
            }
        );
        assert_eq!(overview.by_subject[0].subject, "Data Structures");
    }

    #[tokio::test]
    async fn empty_overview_is_zeroed() {
        let svc = service_at(2025, 1, 1);
        let filter = ResultFilter {
            period: Period::Week,
            ..ResultFilter::default()
        };
        let overview = svc.overview(&filter).await.unwrap();
        assert_eq!(overview.count, 0);
        assert_eq!(overview.average_score, 0);
        assert!(!overview.above_target);
        assert!(overview.by_kind.iter().all(|k| k.average.is_none()));
    }

    #[tokio::test]
    async fn record_uses_percent_for_mcq() {
        let svc = service_at(2024, 1, 20);
        let id = svc
            .record(&report(SessionKind::Mcq, Some(60)), &context())
            .await
            .unwrap();
        let stored = svc.get(id).await.unwrap();
        assert_eq!(id, ResultId::new(6));
        assert_eq!(stored.score, 60);
        assert_eq!(stored.questions_correct, 3);
        assert_eq!(stored.duration, 3);
        assert_eq!(stored.time_spent, 125);
    }

    #[tokio::test]
    async fn record_scores_written_by_answered_points() {
        let svc = service_at(2024, 1, 20);
        let mut written = report(SessionKind::Written, None);
        written.answered_points = Some(45);
        written.total_points = Some(100);
        let id = svc.record(&written, &context()).await.unwrap();
        let stored = svc.get(id).await.unwrap();
        assert_eq!(stored.kind, ResultKind::Written);
        assert_eq!(stored.score, 45);
        assert_eq!(stored.questions_correct, 4);
        assert!(stored.pending_grading);
    }

    #[tokio::test]
    async fn pending_written_results_stay_out_of_averages() {
        let svc = service_at(2024, 1, 20);
        let mut written = report(SessionKind::Written, None);
        written.answered_points = Some(10);
        written.total_points = Some(100);
        svc.record(&written, &context()).await.unwrap();

        let overview = svc.overview(&ResultFilter::default()).await.unwrap();
        assert_eq!(overview.count, 6);
        assert_eq!(overview.pending_grading, 1);
        assert_eq!(overview.average_score, 83);
        assert!(overview.above_target);

        let written_kind = overview.by_kind[1];
        assert_eq!(written_kind.count, 3);
        assert_eq!(written_kind.average, Some(83));
        let algorithms = overview
            .by_subject
            .iter()
            .find(|s| s.subject == "Algorithms")
            .unwrap();
        assert_eq!(algorithms.count, 2);
        assert_eq!(algorithms.average, Some(78));
    }

    #[tokio::test]
    async fn detail_reports_accuracy_and_time_efficiency() {
        let svc = service_at(2024, 1, 20);
        let detail = svc.detail(ResultId::new(1)).await.unwrap();
        assert_eq!(detail.result.title, "Data Structures Fundamentals");
        assert_eq!(detail.band, Some(ScoreBand::Good));
        assert_eq!(detail.accuracy_percent, Some(87));
        assert_eq!(detail.time_efficiency_percent, Some(7));

        let err = svc.detail(ResultId::new(99)).await.unwrap_err();
        assert!(matches!(err, ResultsError::Storage(_)));
    }

    #[tokio::test]
    async fn pending_detail_has_no_band() {
        let svc = service_at(2024, 1, 20);
        let mut written = report(SessionKind::Written, None);
        written.answered_points = Some(95);
        written.total_points = Some(100);
        let id = svc.record(&written, &context()).await.unwrap();
        let detail = svc.detail(id).await.unwrap();
        assert_eq!(detail.band, None);
        assert_eq!(detail.accuracy_percent, Some(80));
        assert_eq!(detail.time_efficiency_percent, Some(31));
    }

    #[tokio::test]
    async fn subjects_are_distinct_newest_first() {
        let svc = service_at(2024, 1, 20);
        let subjects = svc.subjects().await.unwrap();
        assert_eq!(subjects.len(), 5);
        assert_eq!(subjects[0], "Data Structures");
    }
}
