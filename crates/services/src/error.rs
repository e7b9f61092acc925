//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use study_core::model::{ExamId, TestKind};
use study_core::session::{SessionError, SessionKind};

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("exam {exam} has no {test} questions")]
    NoQuestions { exam: ExamId, test: TestKind },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsError {
    #[error("unknown period {0:?}, expected all, week, month or 3months")]
    UnknownPeriod(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the session runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunnerError {
    #[error("{command} is not available in a {kind} session")]
    Unsupported {
        kind: SessionKind,
        command: &'static str,
    },
    #[error("session is no longer running")]
    Closed,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}
