//! JSON catalog files.

use std::path::Path;

use crate::catalog::Catalog;
use crate::repository::StorageError;

/// Parse and validate a catalog document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON or invalid items,
/// and `StorageError::InvalidCatalog` when ids collide or a template or result is invalid.
pub fn parse_catalog(input: &str) -> Result<Catalog, StorageError> {
    let catalog: Catalog =
        serde_json::from_str(input).map_err(|e| StorageError::Serialization(e.to_string()))?;
    catalog.validate()?;
    Ok(catalog)
}

/// Read a catalog from disk.
///
/// # Errors
///
/// Returns `StorageError::Io` if the file cannot be read, otherwise the
/// errors of [`parse_catalog`].
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, StorageError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&input)?;
    log::info!(
        "loaded catalog from {}: {} exams, {} decks",
        path.display(),
        catalog.exams.len(),
        catalog.decks.len()
    );
    Ok(catalog)
}

/// Serialize a catalog as pretty JSON.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn render_catalog(catalog: &Catalog) -> Result<String, StorageError> {
    serde_json::to_string_pretty(catalog).map_err(|e| StorageError::Serialization(e.to_string()))
}
