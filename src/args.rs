//! These structs provide the CLI interface for the ledger CLI.

use crate::model::{Amount, Month, MonthFilter};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: keeps the books of a small association.
///
/// Tracks the dues each member pays per month and the association's expenditures along with
/// photos of their receipts, and prints statements with monthly and overall totals. Everything
/// is kept in a single document in the ledger home directory which can be exported to a file
/// and imported on another machine.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home directory and its configuration file.
    ///
    /// By default the ledger lives in $HOME/ledger. Pass --ledger-home (or set LEDGER_HOME) to
    /// keep it somewhere else.
    Init,
    /// List, add, rename or remove members.
    Member(MemberArgs),
    /// Record what a member paid for a month. Paying again for the same month overwrites.
    Pay(PayArgs),
    /// Add, edit or list expenditures.
    Expense(ExpenseArgs),
    /// Change the statement titles and the association logo.
    Profile(ProfileArgs),
    /// Print the statement: dues per member and month, monthly totals and the balance.
    Report(ReportArgs),
    /// Write the whole ledger to a JSON file.
    Export(ExportArgs),
    /// Replace the whole ledger with the contents of an exported JSON file.
    ///
    /// The current ledger is copied to the backups directory first.
    Import(ImportArgs),
    /// Print the JSON Schema of the ledger document.
    Schema,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and its configuration are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger member` command.
#[derive(Debug, Parser, Clone)]
pub struct MemberArgs {
    #[command(subcommand)]
    action: MemberSubcommand,
}

impl MemberArgs {
    pub fn new(action: MemberSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &MemberSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum MemberSubcommand {
    /// List members with their index and total paid.
    List,
    /// Add a member. Names are stored in upper case and must be unique.
    Add(AddMemberArgs),
    /// Rename the member at INDEX, keeping their payments.
    Rename(RenameMemberArgs),
    /// Remove the member at INDEX together with all of their payments.
    Remove(RemoveMemberArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AddMemberArgs {
    /// The member's name.
    name: String,
}

impl AddMemberArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Parser, Clone)]
pub struct RenameMemberArgs {
    /// The member's index as shown by `ledger member list`.
    index: usize,

    /// The new name.
    name: String,
}

impl RenameMemberArgs {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Parser, Clone)]
pub struct RemoveMemberArgs {
    /// The member's index as shown by `ledger member list`.
    index: usize,

    /// Confirm the removal. Without it nothing is removed.
    #[arg(long)]
    yes: bool,
}

impl RemoveMemberArgs {
    pub fn new(index: usize, yes: bool) -> Self {
        Self { index, yes }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `ledger pay` command.
#[derive(Debug, Parser, Clone)]
pub struct PayArgs {
    /// The member's index as shown by `ledger member list`.
    index: usize,

    /// The amount paid, e.g. 600 or 1,250.50
    amount: Amount,

    /// The month the payment is for, e.g. Jan. Defaults to the current month.
    #[arg(long)]
    month: Option<Month>,
}

impl PayArgs {
    pub fn new(index: usize, amount: Amount, month: Option<Month>) -> Self {
        Self {
            index,
            amount,
            month,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn month(&self) -> Option<Month> {
        self.month
    }
}

/// Args for the `ledger expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    action: ExpenseSubcommand,
}

impl ExpenseArgs {
    pub fn new(action: ExpenseSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &ExpenseSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpenseSubcommand {
    /// Record a new expenditure.
    Add(AddExpenseArgs),
    /// Change an existing expenditure. Fields that are not given keep their value.
    Edit(EditExpenseArgs),
    /// List expenditures, most recent date first.
    List(ListExpensesArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AddExpenseArgs {
    /// The date of the expenditure, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,

    /// What the money was spent on.
    #[arg(long)]
    description: String,

    /// The amount spent. Cannot be zero.
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// A receipt or photo to attach. Can be given more than once.
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

impl AddExpenseArgs {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
        images: Vec<PathBuf>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            images,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }
}

#[derive(Debug, Parser, Clone)]
pub struct EditExpenseArgs {
    /// The id of the expenditure as shown by `ledger expense list`.
    id: String,

    /// The new date, YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The new description.
    #[arg(long)]
    description: Option<String>,

    /// The new amount.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<Amount>,

    /// A receipt or photo to append. Can be given more than once.
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Remove the existing images before appending any given with --image.
    #[arg(long)]
    clear_images: bool,
}

impl EditExpenseArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            description: None,
            amount: None,
            images: Vec::new(),
            clear_images: false,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.images.push(path.into());
        self
    }

    pub fn with_clear_images(mut self) -> Self {
        self.clear_images = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn clear_images(&self) -> bool {
        self.clear_images
    }
}

#[derive(Debug, Parser, Clone)]
pub struct ListExpensesArgs {
    /// Only show expenditures dated in this month (of any year), or All.
    #[arg(long, default_value_t)]
    month: MonthFilter,
}

impl ListExpensesArgs {
    pub fn new(month: MonthFilter) -> Self {
        Self { month }
    }

    pub fn month(&self) -> MonthFilter {
        self.month
    }
}

/// Args for the `ledger profile` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ProfileArgs {
    /// The statement headline.
    #[arg(long)]
    main_title: Option<String>,

    /// The second line of the statement header.
    #[arg(long)]
    sub_title: Option<String>,

    /// An image file to use as the association logo.
    #[arg(long, conflicts_with = "clear_logo")]
    logo: Option<PathBuf>,

    /// Remove the logo.
    #[arg(long)]
    clear_logo: bool,
}

impl ProfileArgs {
    pub fn new(
        main_title: Option<String>,
        sub_title: Option<String>,
        logo: Option<PathBuf>,
        clear_logo: bool,
    ) -> Self {
        Self {
            main_title,
            sub_title,
            logo,
            clear_logo,
        }
    }

    pub fn main_title(&self) -> Option<&str> {
        self.main_title.as_deref()
    }

    pub fn sub_title(&self) -> Option<&str> {
        self.sub_title.as_deref()
    }

    pub fn logo(&self) -> Option<&Path> {
        self.logo.as_deref()
    }

    pub fn clear_logo(&self) -> bool {
        self.clear_logo
    }
}

/// Args for the `ledger report` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ReportArgs {
    /// The month columns to show, e.g. Jan,Feb,Mar. Defaults to all twelve.
    #[arg(long, value_delimiter = ',')]
    months: Vec<Month>,
}

impl ReportArgs {
    pub fn new(months: Vec<Month>) -> Self {
        Self { months }
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }
}

/// Args for the `ledger export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// Where to write the export. Defaults to the configured export file name in the current
    /// directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

/// Args for the `ledger import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The exported JSON file to import.
    path: PathBuf,
}

impl ImportArgs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["ledger", "--ledger-home", "/tmp/ledger-test"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_pay() {
        let args = parse(&["pay", "2", "1,250", "--month", "Mar"]);
        let Command::Pay(pay) = args.command() else {
            panic!("expected pay, got {:?}", args.command());
        };
        assert_eq!(pay.index(), 2);
        assert_eq!(pay.amount(), "1250".parse().unwrap());
        assert_eq!(pay.month(), Some(Month::Mar));
        assert_eq!(args.common().ledger_home().path(), Path::new("/tmp/ledger-test"));
    }

    #[test]
    fn test_parse_expense_add_with_images() {
        let args = parse(&[
            "expense",
            "add",
            "--date",
            "2024-03-09",
            "--description",
            "turf rent",
            "--amount",
            "-50",
            "--image",
            "a.jpg",
            "--image",
            "b.png",
        ]);
        let Command::Expense(expense) = args.command() else {
            panic!("expected expense");
        };
        let ExpenseSubcommand::Add(add) = expense.action() else {
            panic!("expected expense add");
        };
        assert_eq!(add.date(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(add.amount(), Amount::from(-50));
        assert_eq!(add.images().len(), 2);
    }

    #[test]
    fn test_parse_expense_list_defaults_to_all() {
        let args = parse(&["expense", "list"]);
        let Command::Expense(expense) = args.command() else {
            panic!("expected expense");
        };
        let ExpenseSubcommand::List(list) = expense.action() else {
            panic!("expected expense list");
        };
        assert_eq!(list.month(), MonthFilter::All);
    }

    #[test]
    fn test_parse_report_months() {
        let args = parse(&["report", "--months", "Jan,Feb,Dec"]);
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        assert_eq!(report.months(), &[Month::Jan, Month::Feb, Month::Dec]);
    }

    #[test]
    fn test_parse_bad_month() {
        let argv = ["ledger", "pay", "0", "10", "--month", "January"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_logo_conflicts_with_clear_logo() {
        let argv = ["ledger", "profile", "--logo", "a.png", "--clear-logo"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
