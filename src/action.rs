//! The finite set of changes that can be made to a ledger, and the reducer that applies them.
//!
//! `reduce` is a pure function: it takes the current document and an `Action` and returns either
//! the next document or a `Rejection` explaining why nothing changed. It never partially applies
//! an action. Invariants on the document (sorted unique member names, unique expenditure ids) are
//! maintained here and nowhere else.

use crate::model::{
    Amount, AppState, Contribution, Expenditure, ExpenditureDraft, ExpenditureId, Member, Month,
    Voucher,
};
use thiserror::Error;

/// A single user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Set (overwrite) the contribution of the member at `member` for `month`.
    RecordPayment {
        member: usize,
        month: Month,
        amount: Amount,
    },
    AddMember {
        name: String,
    },
    RenameMember {
        index: usize,
        name: String,
    },
    /// Remove a member along with their whole contribution history.
    RemoveMember {
        index: usize,
    },
    /// Prepend a new expenditure. Build this with `Action::create_expenditure` so that it gets a
    /// fresh id.
    CreateExpenditure {
        id: ExpenditureId,
        draft: ExpenditureDraft,
    },
    /// Replace the editable fields of an existing expenditure, keeping its id.
    UpdateExpenditure {
        id: ExpenditureId,
        draft: ExpenditureDraft,
    },
    UpdateProfile {
        main_title: String,
        sub_title: String,
        logo: Voucher,
    },
}

impl Action {
    /// A `CreateExpenditure` action carrying a newly generated id.
    pub fn create_expenditure(draft: ExpenditureDraft) -> Self {
        Action::CreateExpenditure {
            id: ExpenditureId::generate(),
            draft,
        }
    }

    /// A short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::RecordPayment { .. } => "record_payment",
            Action::AddMember { .. } => "add_member",
            Action::RenameMember { .. } => "rename_member",
            Action::RemoveMember { .. } => "remove_member",
            Action::CreateExpenditure { .. } => "create_expenditure",
            Action::UpdateExpenditure { .. } => "update_expenditure",
            Action::UpdateProfile { .. } => "update_profile",
        }
    }
}

/// Why an action was not applied. The document is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("There is no member at index {index}, the ledger has {count} member(s)")]
    NoSuchMember { index: usize, count: usize },

    #[error("A payment amount must be greater than zero, got {0}")]
    NonPositivePayment(Amount),

    #[error("The amount {0} has more digits than the ledger can store")]
    ImpreciseAmount(Amount),

    #[error("A member name cannot be empty")]
    EmptyName,

    #[error("A member named '{0}' already exists")]
    DuplicateMember(String),

    #[error("An expenditure needs a description")]
    EmptyDescription,

    #[error("An expenditure amount cannot be zero")]
    ZeroExpenditure,

    #[error("Expenditure not found: {0}")]
    NoSuchExpenditure(ExpenditureId),

    #[error("An expenditure with id {0} already exists")]
    DuplicateExpenditure(ExpenditureId),
}

/// Applies `action` to `state`, returning the next state.
///
/// # Errors
/// - Returns a `Rejection` if the action's input is invalid for `state`. `state` itself is never
///   modified.
pub fn reduce(state: &AppState, action: Action) -> Result<AppState, Rejection> {
    match action {
        Action::RecordPayment {
            member,
            month,
            amount,
        } => record_payment(state, member, month, amount),
        Action::AddMember { name } => add_member(state, name),
        Action::RenameMember { index, name } => rename_member(state, index, name),
        Action::RemoveMember { index } => remove_member(state, index),
        Action::CreateExpenditure { id, draft } => create_expenditure(state, id, draft),
        Action::UpdateExpenditure { id, draft } => update_expenditure(state, &id, draft),
        Action::UpdateProfile {
            main_title,
            sub_title,
            logo,
        } => {
            let mut next = state.clone();
            next.main_title = main_title;
            next.sub_title = sub_title;
            next.logo = logo;
            Ok(next)
        }
    }
}

fn check_member(state: &AppState, index: usize) -> Result<(), Rejection> {
    let count = state.members().len();
    if index >= count {
        return Err(Rejection::NoSuchMember { index, count });
    }
    Ok(())
}

fn record_payment(
    state: &AppState,
    member: usize,
    month: Month,
    amount: Amount,
) -> Result<AppState, Rejection> {
    check_member(state, member)?;
    if !amount.is_positive() {
        return Err(Rejection::NonPositivePayment(amount));
    }
    check_amount(amount)?;
    let mut next = state.clone();
    next.members[member]
        .contributions
        .insert(month, Contribution::new(amount));
    Ok(next)
}

/// Trims `name` and checks it is non-empty and not already used by a member other than `except`.
/// Names are compared case-insensitively.
fn check_name(state: &AppState, name: String, except: Option<usize>) -> Result<String, Rejection> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Rejection::EmptyName);
    }
    let lower = name.to_lowercase();
    let taken = state
        .members()
        .iter()
        .enumerate()
        .any(|(ix, m)| Some(ix) != except && m.name().to_lowercase() == lower);
    if taken {
        return Err(Rejection::DuplicateMember(name));
    }
    Ok(name)
}

fn sort_members(members: &mut [Member]) {
    members.sort_by(|a, b| a.name.cmp(&b.name));
}

fn add_member(state: &AppState, name: String) -> Result<AppState, Rejection> {
    let name = check_name(state, name, None)?;
    let mut next = state.clone();
    next.members.push(Member::new(name));
    sort_members(&mut next.members);
    Ok(next)
}

fn rename_member(state: &AppState, index: usize, name: String) -> Result<AppState, Rejection> {
    check_member(state, index)?;
    let name = check_name(state, name, Some(index))?;
    let mut next = state.clone();
    next.members[index].name = name;
    sort_members(&mut next.members);
    Ok(next)
}

fn remove_member(state: &AppState, index: usize) -> Result<AppState, Rejection> {
    check_member(state, index)?;
    let mut next = state.clone();
    next.members.remove(index);
    Ok(next)
}

fn check_draft(draft: &ExpenditureDraft) -> Result<(), Rejection> {
    if draft.description.trim().is_empty() {
        return Err(Rejection::EmptyDescription);
    }
    if draft.amount.is_zero() {
        return Err(Rejection::ZeroExpenditure);
    }
    check_amount(draft.amount)
}

/// Every amount in the document must survive being exported and imported again.
fn check_amount(amount: Amount) -> Result<(), Rejection> {
    if amount.fits_document() {
        Ok(())
    } else {
        Err(Rejection::ImpreciseAmount(amount))
    }
}

fn create_expenditure(
    state: &AppState,
    id: ExpenditureId,
    draft: ExpenditureDraft,
) -> Result<AppState, Rejection> {
    check_draft(&draft)?;
    if state.expenditure(&id).is_some() {
        return Err(Rejection::DuplicateExpenditure(id));
    }
    let mut next = state.clone();
    next.expenditures.insert(0, Expenditure::from_draft(id, draft));
    Ok(next)
}

fn update_expenditure(
    state: &AppState,
    id: &ExpenditureId,
    draft: ExpenditureDraft,
) -> Result<AppState, Rejection> {
    let Some(position) = state.expenditures().iter().position(|e| e.id() == id) else {
        return Err(Rejection::NoSuchExpenditure(id.clone()));
    };
    check_draft(&draft)?;
    let mut next = state.clone();
    next.expenditures[position] = Expenditure::from_draft(id.clone(), draft);
    Ok(next)
}
