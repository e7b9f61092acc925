#![forbid(unsafe_code)]

pub mod catalog;
pub mod json;
pub mod repository;
pub mod seed;

pub use catalog::{Catalog, CatalogIssue, DeckEntry, ExamEntry};
pub use json::{load_catalog, parse_catalog};
pub use repository::{
    CatalogRepository, InMemoryRepository, ResultDraft, ResultRepository, Storage, StorageError,
};
pub use seed::{SeedError, sample_catalog};
