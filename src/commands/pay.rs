use crate::action::Action;
use crate::args::PayArgs;
use crate::commands::{ensure_saved, open, Out};
use crate::model::{Member, Month};
use crate::{Config, Result};
use anyhow::Context;

/// Records what the member at `index` paid for a month, overwriting any earlier payment for that
/// month. The month defaults to the current one.
///
/// # Errors
/// - Returns an error if the index is out of range, the amount is not positive, or if the ledger
///   cannot be saved.
pub async fn pay(config: Config, args: PayArgs) -> Result<Out<Member>> {
    let month = args.month().unwrap_or_else(Month::current);
    let mut ledger = open(&config).await;
    let previous = ledger
        .state()
        .members()
        .get(args.index())
        .and_then(|m| m.contribution(month))
        .map(|c| c.amount());

    let status = ledger
        .dispatch(Action::RecordPayment {
            member: args.index(),
            month,
            amount: args.amount(),
        })
        .await?;
    ensure_saved(status)?;

    let member = ledger
        .state()
        .members()
        .get(args.index())
        .cloned()
        .context("The member disappeared after recording the payment")?;
    let mut message = format!(
        "Recorded {} from {} for {month}",
        args.amount(),
        member.name()
    );
    if let Some(previous) = previous {
        message.push_str(&format!(", replacing {previous}"));
    }
    Ok(Out::new(message, member))
}
