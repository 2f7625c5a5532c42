//! Implements the `Store` trait with a single JSON file on local disk.

use crate::model::AppState;
use crate::store::{Store, STATE_KEY};
use crate::{utils, Result};
use anyhow::Context;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the ledger document as `{dir}/current_state.json`.
///
/// Saves are atomic: the document is written to a temporary file, flushed, and renamed over the
/// previous one, so a crash or a full disk never leaves a half-written document behind.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store whose document lives in `dir`. The directory is not created here; `Config` does
    /// that when the ledger home is initialized.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STATE_KEY}.json")),
        }
    }

    /// The path of the document file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unreadable_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
        self.path.with_file_name(format!("{STATE_KEY}.unreadable.{stamp}.json"))
    }
}

#[async_trait::async_trait]
impl Store for FileStore {
    async fn load(&mut self) -> Result<Option<AppState>> {
        if !tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Unable to check for {}", self.path.display()))?
        {
            debug!("No ledger document at {}", self.path.display());
            return Ok(None);
        }
        let state: AppState = utils::deserialize(&self.path).await?;
        debug!(
            "Loaded ledger document from {} ({} members, {} expenditures)",
            self.path.display(),
            state.members().len(),
            state.expenditures().len()
        );
        Ok(Some(state))
    }

    async fn save(&mut self, state: &AppState) -> Result<()> {
        let json = serde_json::to_vec(state).context("Unable to serialize the ledger document")?;
        utils::write_atomic(&self.path, &json)
            .await
            .context("Unable to save the ledger document")?;
        debug!("Saved {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }

    async fn set_aside_unreadable(&mut self) -> Result<Option<String>> {
        let copy = self.unreadable_path();
        utils::copy(&self.path, &copy)
            .await
            .context("Unable to keep a copy of the unreadable ledger document")?;
        Ok(Some(copy.display().to_string()))
    }
}
