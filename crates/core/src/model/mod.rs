mod catalog;
mod flashcard;
mod ids;
mod question;
mod result;

pub use ids::{CardId, DeckId, ExamId, ParseIdError, QuestionId, ResultId};

pub use catalog::{CatalogError, ExamKind, ExamTemplate, FlashcardSet, TestKind};
pub use flashcard::{CardError, Difficulty, FlashCard};
pub use question::{McqQuestion, QuestionError, WrittenQuestion};
pub use result::{ResultKind, ScoreBand, TestResult};
