use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use study_core::model::{
    DeckId, Difficulty, ExamId, ExamTemplate, FlashCard, FlashcardSet, McqQuestion, ResultId,
    ResultKind, TestResult, WrittenQuestion,
};

use crate::catalog::{Catalog, CatalogIssue};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogIssue),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A result waiting for the repository to assign its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDraft {
    pub title: String,
    pub kind: ResultKind,
    pub subject: String,
    pub score: u8,
    pub completed_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub questions_total: u32,
    pub questions_correct: u32,
    pub difficulty: Difficulty,
    pub time_spent_secs: u32,
    pub pending_grading: bool,
}

impl ResultDraft {
    #[must_use]
    pub fn assign_id(self, id: ResultId) -> TestResult {
        TestResult {
            id,
            title: self.title,
            kind: self.kind,
            subject: self.subject,
            score: self.score.min(100),
            max_score: 100,
            completed_at: self.completed_at,
            duration: self.duration_minutes,
            questions_total: self.questions_total,
            questions_correct: self.questions_correct.min(self.questions_total),
            difficulty: self.difficulty,
            time_spent: self.time_spent_secs,
            pending_grading: self.pending_grading,
        }
    }
}

/// Read access to exams, decks and their items.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_exams(&self) -> Result<Vec<ExamTemplate>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the exam does not exist.
    async fn get_exam(&self, id: ExamId) -> Result<ExamTemplate, StorageError>;

    /// MCQ bank for an exam, in presentation order. May be empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the exam does not exist.
    async fn mcq_questions(&self, id: ExamId) -> Result<Vec<McqQuestion>, StorageError>;

    /// Written bank for an exam, in presentation order. May be empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the exam does not exist.
    async fn written_questions(&self, id: ExamId) -> Result<Vec<WrittenQuestion>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_decks(&self) -> Result<Vec<FlashcardSet>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the deck does not exist.
    async fn get_deck(&self, id: DeckId) -> Result<FlashcardSet, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the deck does not exist.
    async fn deck_cards(&self, id: DeckId) -> Result<Vec<FlashCard>, StorageError>;
}

/// Append-only history of completed activities.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Store a result and return its new id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, draft: ResultDraft) -> Result<ResultId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_result(&self, id: ResultId) -> Result<TestResult, StorageError>;

    /// All results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(&self) -> Result<Vec<TestResult>, StorageError>;
}

#[derive(Default)]
struct CatalogState {
    exams: Vec<ExamTemplate>,
    mcq: HashMap<ExamId, Vec<McqQuestion>>,
    written: HashMap<ExamId, Vec<WrittenQuestion>>,
    decks: Vec<FlashcardSet>,
    cards: HashMap<DeckId, Vec<FlashCard>>,
}

#[derive(Default)]
struct ResultState {
    results: Vec<TestResult>,
    next_id: u64,
}

/// Simple in-memory repository implementation.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    catalog: Arc<Mutex<CatalogState>>,
    results: Arc<Mutex<ResultState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository holding `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidCatalog` if the catalog fails validation.
    pub fn from_catalog(catalog: Catalog) -> Result<Self, StorageError> {
        catalog.validate()?;

        let mut state = CatalogState::default();
        for entry in catalog.exams {
            let id = entry.template.id;
            state.mcq.insert(id, entry.mcq_questions);
            state.written.insert(id, entry.written_questions);
            state.exams.push(entry.template);
        }
        for entry in catalog.decks {
            state.cards.insert(entry.set.id, entry.cards);
            state.decks.push(entry.set);
        }

        let next_id = catalog
            .results
            .iter()
            .map(|r| r.id.value())
            .max()
            .unwrap_or(0)
            + 1;
        log::debug!(
            "catalog loaded: {} exams, {} decks, {} results",
            state.exams.len(),
            state.decks.len(),
            catalog.results.len()
        );

        Ok(Self {
            catalog: Arc::new(Mutex::new(state)),
            results: Arc::new(Mutex::new(ResultState {
                results: catalog.results,
                next_id,
            })),
        })
    }

    fn with_catalog<T>(
        &self,
        f: impl FnOnce(&CatalogState) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        f(&guard)
    }

    fn ensure_exam(state: &CatalogState, id: ExamId) -> Result<(), StorageError> {
        if state.exams.iter().any(|e| e.id == id) {
            Ok(())
        } else {
            Err(StorageError::NotFound)
        }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn list_exams(&self) -> Result<Vec<ExamTemplate>, StorageError> {
        self.with_catalog(|state| Ok(state.exams.clone()))
    }

    async fn get_exam(&self, id: ExamId) -> Result<ExamTemplate, StorageError> {
        self.with_catalog(|state| {
            state
                .exams
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or(StorageError::NotFound)
        })
    }

    async fn mcq_questions(&self, id: ExamId) -> Result<Vec<McqQuestion>, StorageError> {
        self.with_catalog(|state| {
            Self::ensure_exam(state, id)?;
            Ok(state.mcq.get(&id).cloned().unwrap_or_default())
        })
    }

    async fn written_questions(&self, id: ExamId) -> Result<Vec<WrittenQuestion>, StorageError> {
        self.with_catalog(|state| {
            Self::ensure_exam(state, id)?;
            Ok(state.written.get(&id).cloned().unwrap_or_default())
        })
    }

    async fn list_decks(&self) -> Result<Vec<FlashcardSet>, StorageError> {
        self.with_catalog(|state| Ok(state.decks.clone()))
    }

    async fn get_deck(&self, id: DeckId) -> Result<FlashcardSet, StorageError> {
        self.with_catalog(|state| {
            state
                .decks
                .iter()
                .find(|d| d.id == id)
                .cloned()
                .ok_or(StorageError::NotFound)
        })
    }

    async fn deck_cards(&self, id: DeckId) -> Result<Vec<FlashCard>, StorageError> {
        self.with_catalog(|state| state.cards.get(&id).cloned().ok_or(StorageError::NotFound))
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, draft: ResultDraft) -> Result<ResultId, StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = ResultId::new(guard.next_id.max(1));
        guard.next_id = id.value() + 1;
        guard.results.push(draft.assign_id(id));
        Ok(id)
    }

    async fn get_result(&self, id: ResultId) -> Result<TestResult, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .results
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_results(&self) -> Result<Vec<TestResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut results = guard.results.clone();
        results.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(results)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    /// # Errors
    ///
    /// Returns `StorageError::InvalidCatalog` if the catalog fails validation.
    pub fn from_catalog(catalog: Catalog) -> Result<Self, StorageError> {
        let repo = InMemoryRepository::from_catalog(catalog)?;
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Ok(Self { catalog, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use study_core::model::{ExamKind, QuestionId};
    use study_core::time::fixed_now;

    fn exam(id: u64) -> ExamTemplate {
        ExamTemplate {
            id: ExamId::new(id),
            title: format!("Exam {id}"),
            subject: "Algorithms".into(),
            kind: ExamKind::Mcq,
            duration: 45,
            questions: 1,
            difficulty: Difficulty::Medium,
            description: String::new(),
            last_attempt: None,
            best_score: None,
        }
    }

    fn draft(score: u8, minutes_ago: i64) -> ResultDraft {
        ResultDraft {
            title: "Exam".into(),
            kind: ResultKind::Mcq,
            subject: "Algorithms".into(),
            score,
            completed_at: fixed_now() - Duration::minutes(minutes_ago),
            duration_minutes: 45,
            questions_total: 5,
            questions_correct: 3,
            difficulty: Difficulty::Medium,
            time_spent_secs: 600,
            pending_grading: false,
        }
    }

    #[tokio::test]
    async fn catalog_serves_exam_banks() {
        let question = McqQuestion::new(
            QuestionId::new(1),
            "Q",
            vec!["a".into(), "b".into()],
            0,
            "",
        )
        .unwrap();
        let catalog = Catalog {
            exams: vec![crate::ExamEntry {
                template: exam(1),
                mcq_questions: vec![question.clone()],
                written_questions: Vec::new(),
            }],
            ..Catalog::default()
        };
        let repo = InMemoryRepository::from_catalog(catalog).unwrap();

        assert_eq!(repo.list_exams().await.unwrap().len(), 1);
        assert_eq!(repo.mcq_questions(ExamId::new(1)).await.unwrap(), vec![question]);
        assert!(repo.written_questions(ExamId::new(1)).await.unwrap().is_empty());
        assert!(matches!(
            repo.mcq_questions(ExamId::new(2)).await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[tokio::test]
    async fn duplicate_exam_ids_are_rejected() {
        let entry = crate::ExamEntry {
            template: exam(1),
            mcq_questions: Vec::new(),
            written_questions: Vec::new(),
        };
        let catalog = Catalog {
            exams: vec![entry.clone(), entry],
            ..Catalog::default()
        };
        let err = InMemoryRepository::from_catalog(catalog).err().unwrap();
        assert!(matches!(
            err,
            StorageError::InvalidCatalog(CatalogIssue::DuplicateExam(_))
        ));
    }

    #[tokio::test]
    async fn results_get_sequential_ids_and_list_newest_first() {
        let repo = InMemoryRepository::new();
        let older = repo.append_result(draft(70, 60)).await.unwrap();
        let newer = repo.append_result(draft(90, 5)).await.unwrap();
        assert_eq!(older, ResultId::new(1));
        assert_eq!(newer, ResultId::new(2));

        let listed = repo.list_results().await.unwrap();
        assert_eq!(listed[0].id, newer);
        assert_eq!(listed[1].score, 70);
        assert_eq!(repo.get_result(older).await.unwrap().max_score, 100);
    }

    #[tokio::test]
    async fn result_scores_are_capped() {
        let repo = InMemoryRepository::new();
        let id = repo.append_result(draft(250, 0)).await.unwrap();
        assert_eq!(repo.get_result(id).await.unwrap().score, 100);

        let overcounted = ResultDraft {
            questions_correct: 9,
            ..draft(80, 0)
        };
        let id = repo.append_result(overcounted).await.unwrap();
        let stored = repo.get_result(id).await.unwrap();
        assert_eq!(stored.questions_correct, 5);
        assert!(stored.validate().is_ok());
    }
}
