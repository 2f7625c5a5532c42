//! Totals and views computed from the ledger document.
//!
//! Everything here is a pure function of an `AppState`. Nothing is cached; the data volume is a
//! few hundred records so the aggregates are recomputed whenever they are needed.

use crate::model::{Amount, AppState, Expenditure, Member, Month, MonthFilter, MONTHS};
use serde::Serialize;

/// Overall income, expense and balance.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub income: Amount,
    pub expense: Amount,
    /// `income - expense`, negative when the association is overspent.
    pub balance: Amount,
}

/// Income and expense for one month.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct MonthTotal {
    pub income: Amount,
    pub expense: Amount,
}

/// Income and expense for each of the twelve months, indexed in canonical month order.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct MonthlyTotals([MonthTotal; 12]);

impl MonthlyTotals {
    pub fn get(&self, month: Month) -> MonthTotal {
        self.0[month.index()]
    }

    /// Iterates `(month, total)` pairs from January to December.
    pub fn iter(&self) -> impl Iterator<Item = (Month, MonthTotal)> + '_ {
        MONTHS.iter().map(move |&m| (m, self.get(m)))
    }
}

impl Serialize for MonthlyTotals {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Sum of every contribution of every member.
pub fn total_income(state: &AppState) -> Amount {
    state.members().iter().map(member_total).sum()
}

/// Sum of every expenditure.
pub fn total_expense(state: &AppState) -> Amount {
    state.expenditures().iter().map(Expenditure::amount).sum()
}

/// `total_income - total_expense`. Not clamped.
pub fn balance(state: &AppState) -> Amount {
    total_income(state) - total_expense(state)
}

pub fn totals(state: &AppState) -> Totals {
    let income = total_income(state);
    let expense = total_expense(state);
    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

/// Everything one member has paid.
pub fn member_total(member: &Member) -> Amount {
    member.contributions().values().map(|c| c.amount()).sum()
}

/// Income per month is the sum of all members' contributions for that month. Expense per month
/// is the sum of expenditures dated in that calendar month of any year.
pub fn monthly_totals(state: &AppState) -> MonthlyTotals {
    let mut totals = [MonthTotal::default(); 12];
    for member in state.members() {
        for (month, contribution) in member.contributions() {
            let slot = &mut totals[month.index()];
            slot.income = slot.income + contribution.amount();
        }
    }
    for expenditure in state.expenditures() {
        let slot = &mut totals[expenditure.month().index()];
        slot.expense = slot.expense + expenditure.amount();
    }
    MonthlyTotals(totals)
}

/// Expenditures sorted most recent first, optionally restricted to one month of any year.
/// Expenditures with the same date keep their stored order.
pub fn filtered_expenses(state: &AppState, filter: MonthFilter) -> Vec<&Expenditure> {
    let mut sorted: Vec<&Expenditure> = state
        .expenditures()
        .iter()
        .filter(|e| filter.matches(e.month()))
        .collect();
    // sort_by is stable
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted
}
