//! The text statement: the payment matrix for a set of months followed by the totals.

use crate::aggregate::{MonthlyTotals, Totals};
use crate::args::ReportArgs;
use crate::commands::{open, Out};
use crate::model::{Amount, AppState, Month, MONTHS};
use crate::{Config, Result};
use serde::Serialize;

const NAME_HEADER: &str = "MEMBER NAME";
const CELL: usize = 9;

/// Everything printed on a statement.
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub main_title: String,
    pub sub_title: String,
    /// The month columns of the matrix, in canonical order.
    pub months: Vec<Month>,
    pub rows: Vec<StatementRow>,
    /// Income and expense for all twelve months, not only the selected ones.
    pub monthly: MonthlyTotals,
    pub totals: Totals,
}

/// One member's line of the payment matrix.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRow {
    pub name: String,
    /// What was paid in each selected month, `None` where nothing was recorded.
    pub paid: Vec<Option<Amount>>,
}

impl Statement {
    fn new(state: &AppState, selected: &[Month], monthly: MonthlyTotals, totals: Totals) -> Self {
        let months: Vec<Month> = if selected.is_empty() {
            MONTHS.to_vec()
        } else {
            MONTHS
                .iter()
                .copied()
                .filter(|m| selected.contains(m))
                .collect()
        };
        let rows = state
            .members()
            .iter()
            .map(|member| StatementRow {
                name: member.name().to_string(),
                paid: months
                    .iter()
                    .map(|&m| member.contribution(m).map(|c| c.amount()))
                    .collect(),
            })
            .collect();
        Self {
            main_title: state.main_title().to_string(),
            sub_title: state.sub_title().to_string(),
            months,
            rows,
            monthly,
            totals,
        }
    }

    fn render(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|r| r.name.chars().count())
            .chain([NAME_HEADER.len(), "TOTAL EXPENSE".len()])
            .max()
            .unwrap_or(0);
        let mut lines = vec![self.main_title.clone(), self.sub_title.clone(), String::new()];

        let mut header = format!("{:<width$}", NAME_HEADER);
        for m in &self.months {
            header.push_str(&format!("{:>w$}", m.to_string(), w = CELL));
        }
        lines.push(header);

        for row in &self.rows {
            let mut line = format!("{:<width$}", row.name);
            for paid in &row.paid {
                line.push_str(&cell(paid.filter(|a| !a.is_zero())));
            }
            lines.push(line);
        }

        let mut income = format!("{:<width$}", "TOTAL INCOME");
        let mut expense = format!("{:<width$}", "TOTAL EXPENSE");
        for &m in &self.months {
            let total = self.monthly.get(m);
            income.push_str(&cell(Some(total.income)));
            expense.push_str(&cell(Some(total.expense)));
        }
        lines.push(income);
        lines.push(expense);

        lines.push(String::new());
        lines.push(format!("INCOME   {:>14}", self.totals.income.to_string()));
        lines.push(format!("EXPENSE  {:>14}", self.totals.expense.to_string()));
        lines.push(format!("BALANCE  {:>14}", self.totals.balance.to_string()));
        lines.join("\n")
    }
}

fn cell(amount: Option<Amount>) -> String {
    match amount {
        Some(a) => format!("{:>w$}", a.to_string(), w = CELL),
        None => format!("{:>w$}", "-", w = CELL),
    }
}

/// Builds the statement for the requested months, all twelve when none are given.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<Statement>> {
    let ledger = open(&config).await;
    let statement = Statement::new(
        ledger.state(),
        args.months(),
        ledger.monthly_totals(),
        ledger.totals(),
    );
    Ok(Out::new(statement.render(), statement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_report_all_months() {
        let env = TestEnv::new().await;
        env.seed().await;
        let out = report(env.config(), ReportArgs::default()).await.unwrap();
        let statement = out.structure().unwrap();
        assert_eq!(statement.months, MONTHS.to_vec());
        assert_eq!(statement.rows.len(), 2);
        assert_eq!(statement.rows[0].paid[0], Some(Amount::from(600)));
        assert_eq!(statement.rows[1].paid[0], None);
        assert_eq!(statement.totals.income, Amount::from(600));
        assert_eq!(statement.totals.expense, Amount::from(200));
        assert_eq!(statement.totals.balance, Amount::from(400));
        assert_eq!(statement.monthly.get(Month::Jan).expense, Amount::from(200));

        let text = out.message();
        assert!(text.starts_with("SPSIB ASSOCIATION\nOFFICIAL DIGITAL AUDIT STATEMENT"));
        assert!(text.contains("TOTAL INCOME"));
        assert!(text.lines().last().unwrap().ends_with("400"));
    }

    #[tokio::test]
    async fn test_report_selected_months_in_canonical_order() {
        let env = TestEnv::new().await;
        env.seed().await;
        let out = report(env.config(), ReportArgs::new(vec![Month::Mar, Month::Jan]))
            .await
            .unwrap();
        let statement = out.structure().unwrap();
        assert_eq!(statement.months, vec![Month::Jan, Month::Mar]);
        assert_eq!(statement.rows[0].paid, vec![Some(Amount::from(600)), None]);
        let header = out.message().lines().nth(3).unwrap();
        assert!(header.contains("Jan") && header.contains("Mar"));
        assert!(!header.contains("Feb"));
    }

    #[test]
    fn test_render_negative_balance_and_dashes() {
        let mut state = AppState::default();
        state.members.push(crate::model::Member::new("A"));
        let totals = Totals {
            income: Amount::ZERO,
            expense: Amount::from(1500),
            balance: Amount::from(-1500),
        };
        let statement = Statement::new(&state, &[Month::Feb], MonthlyTotals::default(), totals);
        let text = statement.render();
        let member_line = text.lines().nth(4).unwrap();
        assert!(member_line.starts_with('A'));
        assert!(member_line.trim_end().ends_with('-'));
        assert!(text.ends_with("-1,500"), "{text}");
    }
}
