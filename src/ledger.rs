//! The running ledger session.
//!
//! A `Ledger` exclusively owns the one in-memory copy of the document and the store it is saved
//! to. Every committed action is saved straight away. A failed save does not undo the action:
//! the in-memory document stays authoritative and the next commit (or `retry_save`) writes it
//! again.
//!
//! A stored document that cannot be read is never overwritten in place. The session starts from
//! the default document, and before its first save it asks the store to keep the unreadable one
//! aside. If that fails, nothing is saved.

use crate::action::{reduce, Action, Rejection};
use crate::aggregate::{self, MonthlyTotals, Totals};
use crate::document::{export_state, import_state, ImportError};
use crate::model::{AppState, Expenditure, MonthFilter};
use crate::store::Store;
use crate::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

/// Whether the document reached durable storage after a change.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    /// The change is held in memory only. The message says why the save failed.
    NotSaved(String),
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }
}

pub struct Ledger<S: Store> {
    state: AppState,
    store: S,
    dirty: bool,
    unreadable: bool,
}

impl<S> Ledger<S>
where
    S: Store + Send,
{
    /// Loads the document from `store`. If nothing has been saved yet, or the store cannot be
    /// read, the session starts from the default document.
    pub async fn open(mut store: S) -> Self {
        let (state, unreadable) = match store.load().await {
            Ok(Some(state)) => (state, false),
            Ok(None) => {
                debug!("No saved ledger, starting a new one");
                (AppState::default(), false)
            }
            Err(e) => {
                warn!("Unable to load the saved ledger, starting from an empty one: {e:#}");
                (AppState::default(), true)
            }
        };
        Self {
            state,
            store,
            dirty: false,
            unreadable,
        }
    }

    /// A read-only view of the current document.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// True when the in-memory document has changes that did not reach the store.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// True when the store held a document that could not be read and it has not been set aside
    /// yet. The current document is then the default one, not the user's ledger.
    pub fn load_failed(&self) -> bool {
        self.unreadable
    }

    /// Applies `action` and saves the result.
    ///
    /// # Errors
    /// - Returns the `Rejection` if the action is invalid; the document is unchanged and nothing
    ///   is saved.
    ///
    /// A failed save is not an error here, it is reported through `SaveStatus::NotSaved`.
    pub async fn dispatch(&mut self, action: Action) -> std::result::Result<SaveStatus, Rejection> {
        let name = action.name();
        let next = reduce(&self.state, action).inspect_err(|r| debug!("{name} rejected: {r}"))?;
        debug!("{name} applied");
        Ok(self.commit(next).await)
    }

    /// Parses `raw` as a ledger document and, if it is valid, replaces the whole document with it
    /// and saves.
    ///
    /// # Errors
    /// - Returns an `ImportError` if `raw` is not a valid document. The current document is
    ///   untouched and nothing is saved.
    pub async fn import(&mut self, raw: &str) -> std::result::Result<SaveStatus, ImportError> {
        let imported = import_state(raw).inspect_err(|e| debug!("import rejected: {e}"))?;
        debug!(
            "importing {} members and {} expenditures",
            imported.members().len(),
            imported.expenditures().len()
        );
        Ok(self.commit(imported).await)
    }

    /// The current document serialized for export.
    pub fn export(&self) -> Result<String> {
        export_state(&self.state)
    }

    /// Writes the current document to the store again, e.g. after an earlier save failed.
    pub async fn retry_save(&mut self) -> SaveStatus {
        self.save().await
    }

    async fn commit(&mut self, next: AppState) -> SaveStatus {
        self.state = next;
        self.dirty = true;
        self.save().await
    }

    async fn save(&mut self) -> SaveStatus {
        if self.unreadable {
            match self.store.set_aside_unreadable().await {
                Ok(Some(copy)) => warn!("The unreadable ledger was kept as {copy}"),
                Ok(None) => {}
                Err(e) => {
                    warn!("Not overwriting the unreadable ledger: {e:#}");
                    return SaveStatus::NotSaved(format!(
                        "the saved ledger could not be read or set aside: {e:#}"
                    ));
                }
            }
            self.unreadable = false;
        }
        let mut stamped = self.state.clone();
        stamped.stamp_backup(Utc::now());
        match self.store.save(&stamped).await {
            Ok(()) => {
                self.state = stamped;
                self.dirty = false;
                SaveStatus::Saved
            }
            Err(e) => {
                warn!("Changes are held in memory only, saving failed: {e:#}");
                SaveStatus::NotSaved(format!("{e:#}"))
            }
        }
    }

    pub fn totals(&self) -> Totals {
        aggregate::totals(&self.state)
    }

    pub fn monthly_totals(&self) -> MonthlyTotals {
        aggregate::monthly_totals(&self.state)
    }

    pub fn filtered_expenses(&self, filter: MonthFilter) -> Vec<&Expenditure> {
        aggregate::filtered_expenses(&self.state, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, ExpenditureDraft, Month};
    use crate::store::{FileStore, MemoryStore};
    use crate::utils;
    use chrono::NaiveDate;

    fn add(name: &str) -> Action {
        Action::AddMember {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_first_run_uses_default() {
        let ledger = Ledger::open(MemoryStore::default()).await;
        assert_eq!(ledger.state(), &AppState::default());
        assert!(!ledger.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_open_load_failure_uses_default() {
        let mut store = MemoryStore::with_state(AppState::default());
        store.set_fail_loads(true);
        let ledger = Ledger::open(store).await;
        assert!(ledger.state().members().is_empty());
        assert!(ledger.load_failed());
    }

    #[tokio::test]
    async fn test_unreadable_document_is_set_aside_before_first_save() {
        let kept = reduce(&AppState::default(), add("OLD")).unwrap();
        let mut store = MemoryStore::with_state(kept.clone());
        store.set_fail_loads(true);
        let mut ledger = Ledger::open(store).await;

        assert!(ledger.dispatch(add("NEW")).await.unwrap().is_saved());
        assert!(ledger.dispatch(add("NEWER")).await.unwrap().is_saved());
        assert!(!ledger.load_failed());
        assert_eq!(ledger.store().set_aside(), &[kept]);
        assert_eq!(ledger.store().stored().unwrap().members().len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_file_survives_a_change() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let original = r#"{
            "mainTitle": "CLUB", "subTitle": "STATEMENT", "logo": "",
            "members": [
                { "name": "A", "contributions": { "Jan": { "amount": 600 } } },
                { "name": "B", "contributions": {} }
            ],
            "expenditures": [
                { "id": "x1", "date": "", "description": "RENT", "amount": 200, "images": [] }
            ]
        }"#;
        utils::write(store.path(), original).await.unwrap();

        let mut ledger = Ledger::open(store).await;
        assert!(ledger.load_failed());
        assert!(ledger.dispatch(add("C")).await.unwrap().is_saved());

        let mut names = Vec::new();
        let mut entries = utils::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        let copy = names
            .iter()
            .find(|n| n.starts_with("current_state.unreadable."))
            .unwrap();
        let kept = utils::read(&dir.path().join(copy)).await.unwrap();
        assert_eq!(kept, original);

        let reopened = Ledger::open(FileStore::new(dir.path())).await;
        assert_eq!(reopened.state().members()[0].name(), "C");
    }

    #[tokio::test]
    async fn test_unreadable_document_that_cannot_be_set_aside_is_not_overwritten() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        // A directory where the document should be can be neither read nor copied
        utils::make_dir(store.path()).await.unwrap();

        let mut ledger = Ledger::open(store).await;
        assert!(ledger.load_failed());
        let status = ledger.dispatch(add("C")).await.unwrap();
        assert!(!status.is_saved());
        assert!(ledger.load_failed());
        assert!(ledger.store().path().is_dir());
    }

    #[tokio::test]
    async fn test_dispatch_saves_and_stamps() {
        let mut ledger = Ledger::open(MemoryStore::default()).await;
        let status = ledger.dispatch(add("AMY")).await.unwrap();
        assert_eq!(status, SaveStatus::Saved);
        assert!(ledger.state().last_backup().is_some());
        assert_eq!(ledger.store().stored(), Some(ledger.state()));
        assert_eq!(ledger.store().saves(), 1);
    }

    #[tokio::test]
    async fn test_rejected_action_changes_nothing() {
        let mut ledger = Ledger::open(MemoryStore::default()).await;
        ledger.dispatch(add("AMY")).await.unwrap();
        let before = ledger.state().clone();
        let result = ledger
            .dispatch(Action::RecordPayment {
                member: 7,
                month: Month::Jan,
                amount: Amount::from(600),
            })
            .await;
        assert!(matches!(result, Err(Rejection::NoSuchMember { .. })));
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.store().saves(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_is_not_fatal() {
        let mut store = MemoryStore::default();
        store.set_fail_saves(true);
        let mut ledger = Ledger::open(store).await;

        let status = ledger.dispatch(add("AMY")).await.unwrap();
        assert!(!status.is_saved());
        assert!(ledger.has_unsaved_changes());
        // The session keeps working from memory
        assert_eq!(ledger.state().members().len(), 1);
        let status = ledger.dispatch(add("BOB")).await.unwrap();
        assert!(matches!(status, SaveStatus::NotSaved(_)));
        assert_eq!(ledger.state().members().len(), 2);
        assert!(ledger.store().stored().is_none());
    }

    #[tokio::test]
    async fn test_import_replaces_state() {
        let mut ledger = Ledger::open(MemoryStore::default()).await;
        ledger.dispatch(add("OLD")).await.unwrap();

        let mut other = Ledger::open(MemoryStore::default()).await;
        other.dispatch(add("NEW")).await.unwrap();
        let raw = other.export().unwrap();

        let status = ledger.import(&raw).await.unwrap();
        assert!(status.is_saved());
        assert_eq!(ledger.state().members()[0].name(), "NEW");
    }

    #[tokio::test]
    async fn test_malformed_import_leaves_state_intact() {
        let mut ledger = Ledger::open(MemoryStore::default()).await;
        ledger.dispatch(add("AMY")).await.unwrap();
        ledger
            .dispatch(Action::create_expenditure(ExpenditureDraft {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                description: "RENT".to_string(),
                amount: Amount::from(200),
                images: vec![],
            }))
            .await
            .unwrap();
        let before = ledger.state().clone();
        let saves = ledger.store().saves();

        let raw = r#"{ "mainTitle": "X", "subTitle": "Y", "logo": "", "expenditures": [] }"#;
        assert!(ledger.import(raw).await.is_err());
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.store().stored(), Some(&before));
        assert_eq!(ledger.store().saves(), saves);
    }

    #[tokio::test]
    async fn test_retry_save() {
        let mut store = MemoryStore::default();
        store.set_fail_saves(true);
        let mut ledger = Ledger::open(store).await;
        ledger.dispatch(add("AMY")).await.unwrap();
        assert!(ledger.has_unsaved_changes());

        ledger.store_mut().set_fail_saves(false);
        assert!(ledger.retry_save().await.is_saved());
        assert!(!ledger.has_unsaved_changes());
        assert_eq!(ledger.store().stored().unwrap().members()[0].name(), "AMY");
    }

    #[tokio::test]
    async fn test_derived_views() {
        let mut ledger = Ledger::open(MemoryStore::default()).await;
        ledger.dispatch(add("A")).await.unwrap();
        ledger
            .dispatch(Action::RecordPayment {
                member: 0,
                month: Month::Jan,
                amount: Amount::from(600),
            })
            .await
            .unwrap();
        ledger
            .dispatch(Action::create_expenditure(ExpenditureDraft {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                description: "X".to_string(),
                amount: Amount::from(200),
                images: vec![],
            }))
            .await
            .unwrap();
        assert_eq!(ledger.totals().balance, Amount::from(400));
        assert_eq!(ledger.monthly_totals().get(Month::Jan).expense, Amount::from(200));
        assert_eq!(ledger.filtered_expenses(MonthFilter::All).len(), 1);
    }
}
