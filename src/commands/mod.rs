//! Command handlers for the ledger CLI.
//!
//! Each handler opens the ledger in the configured home directory, does its work through the
//! `Ledger` session and returns an `Out`. A handler never leaves a change unsaved: if the store
//! cannot be written the handler returns an error, since the process is about to exit and the
//! in-memory document would be lost.

mod expense;
mod init;
mod member;
mod pay;
mod profile;
mod report;
mod schema;
mod transfer;

use crate::ledger::{Ledger, SaveStatus};
use crate::store::FileStore;
use crate::{Config, Result};
use anyhow::bail;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use expense::{expense_add, expense_edit, expense_list};
pub use init::init;
pub use member::{member_add, member_list, member_remove, member_rename, MemberRow};
pub use pay::pay;
pub use profile::{profile, Profile};
pub use report::{report, Statement, StatementRow};
pub use schema::schema;
pub use transfer::{export, import};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

async fn open(config: &Config) -> Ledger<FileStore> {
    Ledger::open(config.store()).await
}

fn ensure_saved(status: SaveStatus) -> Result<()> {
    match status {
        SaveStatus::Saved => Ok(()),
        SaveStatus::NotSaved(reason) => {
            bail!("The change was accepted but could not be saved: {reason}")
        }
    }
}

/// Text entered on the command line is stored in upper case, as on the printed statement.
fn shout(s: &str) -> String {
    s.trim().to_uppercase()
}
