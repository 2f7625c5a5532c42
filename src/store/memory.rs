//! Implements the `Store` trait in memory for tests and for embedding the ledger without a disk.

use crate::model::AppState;
use crate::store::Store;
use crate::Result;
use anyhow::bail;

/// An implementation of the `Store` trait that keeps the document in memory. It can be told to
/// fail its saves so that callers can exercise the unavailable-storage path.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Option<AppState>,
    fail_saves: bool,
    fail_loads: bool,
    saves: usize,
    set_aside: Vec<AppState>,
}

impl MemoryStore {
    /// A store that already holds `state`, as if it had been saved in an earlier session.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Makes subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Makes subsequent loads fail (or succeed again).
    pub fn set_fail_loads(&mut self, fail: bool) {
        self.fail_loads = fail;
    }

    /// The document as last saved.
    pub fn stored(&self) -> Option<&AppState> {
        self.state.as_ref()
    }

    /// How many saves have succeeded.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Documents kept aside after a failed load, oldest first.
    pub fn set_aside(&self) -> &[AppState] {
        &self.set_aside
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn load(&mut self) -> Result<Option<AppState>> {
        if self.fail_loads {
            bail!("The in-memory store is unavailable")
        }
        Ok(self.state.clone())
    }

    async fn save(&mut self, state: &AppState) -> Result<()> {
        if self.fail_saves {
            bail!("The in-memory store is unavailable")
        }
        self.state = Some(state.clone());
        self.saves += 1;
        Ok(())
    }

    async fn set_aside_unreadable(&mut self) -> Result<Option<String>> {
        let Some(state) = &self.state else {
            return Ok(None);
        };
        self.set_aside.push(state.clone());
        Ok(Some(format!("set-aside #{}", self.set_aside.len())))
    }
}
