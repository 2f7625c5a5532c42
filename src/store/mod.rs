//! Durable storage for the ledger document.
//!
//! A store holds exactly one `AppState` under a fixed key. There are no per-entity rows: every
//! save writes the complete document, replacing whatever was there before.

mod file;
mod memory;

use crate::model::AppState;
use crate::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

/// The fixed logical key the ledger document is stored under.
pub const STATE_KEY: &str = "current_state";

/// Loads and saves the single ledger document.
///
/// Callers must not overlap `save` calls against the same store; the session guarantees this by
/// taking `&mut self` for every write.
#[async_trait::async_trait]
pub trait Store {
    /// Returns the last saved document, or `None` if nothing has been saved yet. A first run is
    /// not an error.
    async fn load(&mut self) -> Result<Option<AppState>>;

    /// Replaces the stored document with `state`. The document is durable when this returns
    /// `Ok`. On error the previously stored document is left intact.
    async fn save(&mut self, state: &AppState) -> Result<()>;

    /// Keeps a copy of a stored document that `load` could not read, so that the next `save`
    /// does not destroy it. Returns where the copy went, if anywhere.
    async fn set_aside_unreadable(&mut self) -> Result<Option<String>> {
        Ok(None)
    }
}
