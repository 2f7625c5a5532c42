//! Export and import of the whole ledger document.
//!
//! An export file has exactly the same shape as the document held by the store, so either one
//! can be used to restore the other.

use crate::model::AppState;
use crate::Result;
use anyhow::Context;
use thiserror::Error;

/// The suggested name for export files.
pub const EXPORT_FILE_NAME: &str = "SPSIB_BACKUP.json";

/// Why an imported document was not accepted.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("The file is empty")]
    Empty,

    #[error("The file is not a valid ledger document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serializes the whole ledger as pretty-printed JSON.
///
/// # Errors
/// - Only if an amount cannot be represented as a JSON number, which `Amount` never produces.
pub fn export_state(state: &AppState) -> Result<String> {
    serde_json::to_string_pretty(state).context("Unable to serialize the ledger document")
}

/// Parses a document produced by `export_state` (or by the store, or by the web app that
/// preceded this tool).
///
/// # Errors
/// - `ImportError::Empty` if `raw` is blank.
/// - `ImportError::Malformed` if `raw` is not JSON or does not have the ledger document shape,
///   e.g. the `members` field is missing.
pub fn import_state(raw: &str) -> std::result::Result<AppState, ImportError> {
    if raw.trim().is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(serde_json::from_str(raw)?)
}
