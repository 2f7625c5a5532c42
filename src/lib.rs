//! Books for a small dues-collecting association.
//!
//! The whole ledger is one `AppState` document. `aggregate` derives totals from it, `action`
//! changes it through a pure reducer, `store` persists it and `Ledger` ties the three together
//! into a session.

pub mod action;
pub mod aggregate;
pub mod args;
mod backup;
pub mod commands;
mod config;
pub mod document;
mod error;
pub mod ledger;
pub mod model;
pub mod store;
mod utils;


pub use action::{reduce, Action, Rejection};
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use ledger::{Ledger, SaveStatus};
