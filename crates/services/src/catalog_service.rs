use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use storage::repository::CatalogRepository;
use study_core::model::{
    DeckId, ExamId, ExamTemplate, FlashCard, FlashcardSet, McqQuestion, TestKind, WrittenQuestion,
};
use study_core::session::{FlashcardSession, McqSession, WrittenSession, round_percent};

use crate::error::CatalogError;

/// Question bank selected for a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedTest {
    Mcq(Vec<McqQuestion>),
    Written(Vec<WrittenQuestion>),
}

impl PlannedTest {
    #[must_use]
    pub fn kind(&self) -> TestKind {
        match self {
            PlannedTest::Mcq(_) => TestKind::Mcq,
            PlannedTest::Written(_) => TestKind::Written,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PlannedTest::Mcq(questions) => questions.len(),
            PlannedTest::Written(questions) => questions.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything needed to start a timed test for an exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamPlan {
    pub exam: ExamTemplate,
    pub test: PlannedTest,
    pub duration_secs: u32,
}

/// A started test, ready to hand to the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum StartedTest {
    Mcq(McqSession),
    Written(WrittenSession),
}

impl ExamPlan {
    /// Start the planned test.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Session` if the bank cannot start a session.
    pub fn start(self) -> Result<StartedTest, CatalogError> {
        let started = match self.test {
            PlannedTest::Mcq(questions) => {
                StartedTest::Mcq(McqSession::start(questions, self.duration_secs)?)
            }
            PlannedTest::Written(questions) => {
                StartedTest::Written(WrittenSession::start(questions, self.duration_secs)?)
            }
        };
        Ok(started)
    }
}

/// Totals across every flashcard set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeckStats {
    pub sets: u32,
    pub total_cards: u64,
    pub mastered_cards: u64,
    pub studied_today: u64,
    pub mastery_percent: u8,
}

/// Read-side orchestration over exams and flashcard sets.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    shuffle_seed: Option<u64>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self {
            catalog,
            shuffle_seed: None,
        }
    }

    /// Shuffle question and card order deterministically from `seed`.
    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list_exams(&self) -> Result<Vec<ExamTemplate>, CatalogError> {
        Ok(self.catalog.list_exams().await?)
    }

    /// Plan the test an exam opens with. Mixed exams open with MCQ.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the exam is missing and
    /// `CatalogError::NoQuestions` if its bank is empty.
    pub async fn plan_exam(&self, exam_id: ExamId) -> Result<ExamPlan, CatalogError> {
        let exam = self.catalog.get_exam(exam_id).await?;
        let test = exam.kind.initial_test();
        self.plan_for(exam, test).await
    }

    /// Plan a specific part of an exam, e.g. the written half of a mixed exam.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the exam is missing and
    /// `CatalogError::NoQuestions` if the requested bank is empty.
    pub async fn plan_test(&self, exam_id: ExamId, test: TestKind) -> Result<ExamPlan, CatalogError> {
        let exam = self.catalog.get_exam(exam_id).await?;
        self.plan_for(exam, test).await
    }

    async fn plan_for(&self, exam: ExamTemplate, test: TestKind) -> Result<ExamPlan, CatalogError> {
        let planned = match test {
            TestKind::Mcq => {
                let mut questions = self.catalog.mcq_questions(exam.id).await?;
                self.shuffle(&mut questions);
                PlannedTest::Mcq(questions)
            }
            TestKind::Written => {
                let mut questions = self.catalog.written_questions(exam.id).await?;
                self.shuffle(&mut questions);
                PlannedTest::Written(questions)
            }
        };
        if planned.is_empty() {
            return Err(CatalogError::NoQuestions {
                exam: exam.id,
                test,
            });
        }

        log::debug!(
            "planned {} test for exam {} with {} questions",
            test,
            exam.id,
            planned.len()
        );
        Ok(ExamPlan {
            duration_secs: exam.duration_secs(),
            exam,
            test: planned,
        })
    }

    /// Sets whose title or subject contains `query`, ignoring case.
    /// A blank query lists every set.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn search_decks(&self, query: &str) -> Result<Vec<FlashcardSet>, CatalogError> {
        let decks = self.catalog.list_decks().await?;
        Ok(decks.into_iter().filter(|d| d.matches(query)).collect())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the set is missing.
    pub async fn get_deck(&self, deck_id: DeckId) -> Result<FlashcardSet, CatalogError> {
        Ok(self.catalog.get_deck(deck_id).await?)
    }

    /// Cards in a set whose front or back contains `query`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the set is missing.
    pub async fn search_cards(
        &self,
        deck_id: DeckId,
        query: &str,
    ) -> Result<Vec<FlashCard>, CatalogError> {
        let cards = self.catalog.deck_cards(deck_id).await?;
        Ok(cards.into_iter().filter(|c| c.matches(query)).collect())
    }

    /// Start a study pass over every card in a set.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the set is missing and
    /// `CatalogError::Session` if it has no cards.
    pub async fn start_deck(&self, deck_id: DeckId) -> Result<FlashcardSession, CatalogError> {
        let mut cards = self.catalog.deck_cards(deck_id).await?;
        self.shuffle(&mut cards);
        Ok(FlashcardSession::start(cards)?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn deck_stats(&self) -> Result<DeckStats, CatalogError> {
        let decks = self.catalog.list_decks().await?;
        let mut stats = decks.iter().fold(DeckStats::default(), |mut acc, deck| {
            acc.sets = acc.sets.saturating_add(1);
            acc.total_cards += u64::from(deck.card_count);
            acc.mastered_cards += u64::from(deck.mastered_cards);
            acc.studied_today += u64::from(deck.studied_today);
            acc
        });
        stats.mastery_percent = round_percent(
            usize::try_from(stats.mastered_cards).unwrap_or(usize::MAX),
            usize::try_from(stats.total_cards).unwrap_or(usize::MAX),
        );
        Ok(stats)
    }

    fn shuffle<T>(&self, items: &mut [T]) {
        if let Some(seed) = self.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            items.shuffle(&mut rng);
        }
    }
}
