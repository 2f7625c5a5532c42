//! Types that represent the ledger document, such as `AppState`, `Member` and `Expenditure`.
mod amount;
mod month;
mod voucher;

pub use amount::{Amount, AmountError};
use chrono::{DateTime, NaiveDate, Utc};
pub use month::{Month, MonthFilter, MONTHS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
pub use voucher::Voucher;

/// The branding used on a brand new ledger.
pub const DEFAULT_MAIN_TITLE: &str = "SPSIB ASSOCIATION";
pub const DEFAULT_SUB_TITLE: &str = "OFFICIAL DIGITAL AUDIT STATEMENT";

/// The whole ledger. This is the one document that is persisted, exported and imported.
///
/// Field names are written in camelCase so that the document has the same shape in the store and
/// in export files:
/// ```json
/// {
///   "mainTitle": "SPSIB ASSOCIATION",
///   "subTitle": "OFFICIAL DIGITAL AUDIT STATEMENT",
///   "logo": "",
///   "members": [{ "name": "J. DOE", "contributions": { "Jan": { "amount": 600 } } }],
///   "expenditures": [{
///     "id": "5f0c...", "date": "2024-01-15", "description": "TURF RENT",
///     "amount": 200, "images": []
///   }],
///   "lastBackup": "2024-01-16T08:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Headline shown at the top of every statement.
    pub(crate) main_title: String,
    /// Second line of the statement header.
    pub(crate) sub_title: String,
    /// The association logo, empty when none has been set.
    #[serde(default)]
    pub(crate) logo: Voucher,
    /// Dues-paying members, kept sorted by name.
    pub(crate) members: Vec<Member>,
    /// Expenditures in the order they were created, newest first.
    pub(crate) expenditures: Vec<Expenditure>,
    /// When the document was last written to durable storage.
    #[serde(default)]
    pub(crate) last_backup: Option<DateTime<Utc>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            main_title: DEFAULT_MAIN_TITLE.to_string(),
            sub_title: DEFAULT_SUB_TITLE.to_string(),
            logo: Voucher::default(),
            members: Vec::new(),
            expenditures: Vec::new(),
            last_backup: None,
        }
    }
}

impl AppState {
    pub fn main_title(&self) -> &str {
        &self.main_title
    }

    pub fn sub_title(&self) -> &str {
        &self.sub_title
    }

    pub fn logo(&self) -> &Voucher {
        &self.logo
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn expenditures(&self) -> &[Expenditure] {
        &self.expenditures
    }

    pub fn last_backup(&self) -> Option<DateTime<Utc>> {
        self.last_backup
    }

    /// Finds an expenditure by its id.
    pub fn expenditure(&self, id: &ExpenditureId) -> Option<&Expenditure> {
        self.expenditures.iter().find(|e| &e.id == id)
    }

    /// Records when the document was last made durable.
    pub(crate) fn stamp_backup(&mut self, at: DateTime<Utc>) {
        self.last_backup = Some(at);
    }
}

/// A dues-paying participant. A month with no entry in `contributions` means nothing has been
/// recorded for it, which is not the same as a recorded zero.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) contributions: BTreeMap<Month, Contribution>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contributions: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contributions(&self) -> &BTreeMap<Month, Contribution> {
        &self.contributions
    }

    /// The contribution recorded for `month`, if any.
    pub fn contribution(&self, month: Month) -> Option<&Contribution> {
        self.contributions.get(&month)
    }
}

/// One member's payment for one month.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    #[serde(default)]
    pub(crate) amount: Amount,
}

impl Contribution {
    pub fn new(amount: Amount) -> Self {
        Self { amount }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// The identity of an expenditure. Generated once at creation and never reused.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ExpenditureId(String);

impl ExpenditureId {
    /// A fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExpenditureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One outgoing payment with its supporting vouchers.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expenditure {
    pub(crate) id: ExpenditureId,
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) amount: Amount,
    #[serde(default)]
    pub(crate) images: Vec<Voucher>,
}

impl Expenditure {
    pub(crate) fn from_draft(id: ExpenditureId, draft: ExpenditureDraft) -> Self {
        Self {
            id,
            date: draft.date,
            description: draft.description,
            amount: draft.amount,
            images: draft.images,
        }
    }

    pub fn id(&self) -> &ExpenditureId {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The calendar month this expenditure is bucketed into, regardless of year.
    pub fn month(&self) -> Month {
        Month::of(self.date)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn images(&self) -> &[Voucher] {
        &self.images
    }

    /// The editable fields of this expenditure, used as the starting point for an edit.
    pub fn to_draft(&self) -> ExpenditureDraft {
        ExpenditureDraft {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            images: self.images.clone(),
        }
    }
}

/// The mutable fields of an expenditure, everything except its id.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpenditureDraft {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Amount,
    pub images: Vec<Voucher>,
}
