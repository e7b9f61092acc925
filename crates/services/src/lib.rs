#![forbid(unsafe_code)]

pub mod catalog_service;
pub mod error;
pub mod results_service;
pub mod runner;

pub use study_core::Clock;

pub use catalog_service::{CatalogService, DeckStats, ExamPlan, PlannedTest, StartedTest};
pub use error::{CatalogError, ResultsError, RunnerError};
pub use results_service::{
    Period, ResultContext, ResultDetail, ResultFilter, ResultsOverview, ResultsService, TARGET_SCORE,
};
pub use runner::{
    RunnerConfig, SessionCommand, SessionExit, SessionHandle, SessionMachine, SessionReport,
    spawn_session,
};
