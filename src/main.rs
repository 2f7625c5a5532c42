use clap::Parser;
use dues_ledger::args::{Args, Command, ExpenseSubcommand, MemberSubcommand};
use dues_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Member(member_args) => {
            let config = Config::load(home).await?;
            match member_args.action() {
                MemberSubcommand::List => commands::member_list(config).await?.print(),
                MemberSubcommand::Add(args) => {
                    commands::member_add(config, args.clone()).await?.print()
                }
                MemberSubcommand::Rename(args) => {
                    commands::member_rename(config, args.clone()).await?.print()
                }
                MemberSubcommand::Remove(args) => {
                    commands::member_remove(config, args.clone()).await?.print()
                }
            }
        }

        Command::Pay(pay_args) => {
            let config = Config::load(home).await?;
            commands::pay(config, pay_args.clone()).await?.print()
        }

        Command::Expense(expense_args) => {
            let config = Config::load(home).await?;
            match expense_args.action() {
                ExpenseSubcommand::Add(args) => {
                    commands::expense_add(config, args.clone()).await?.print()
                }
                ExpenseSubcommand::Edit(args) => {
                    commands::expense_edit(config, args.clone()).await?.print()
                }
                ExpenseSubcommand::List(args) => {
                    commands::expense_list(config, args.clone()).await?.print()
                }
            }
        }

        Command::Profile(profile_args) => {
            let config = Config::load(home).await?;
            commands::profile(config, profile_args.clone())
                .await?
                .print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(config, report_args.clone()).await?.print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(config, export_args.clone()).await?.print()
        }

        Command::Import(import_args) => {
            let config = Config::load(home).await?;
            commands::import(config, import_args.clone()).await?.print()
        }

        Command::Schema => commands::schema().await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and this binary.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
