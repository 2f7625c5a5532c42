//! Expenditure command handlers.

use crate::action::{Action, Rejection};
use crate::args::{AddExpenseArgs, EditExpenseArgs, ListExpensesArgs};
use crate::commands::{ensure_saved, open, shout, Out};
use crate::model::{Amount, Expenditure, ExpenditureDraft, ExpenditureId, Voucher};
use crate::{Config, Result};
use anyhow::Context;
use std::path::PathBuf;

/// Records a new expenditure with any attached images.
///
/// # Errors
/// - Returns an error if an image cannot be read, the description is blank, the amount is zero,
///   or if the ledger cannot be saved.
pub async fn expense_add(config: Config, args: AddExpenseArgs) -> Result<Out<Expenditure>> {
    let images = load_images(args.images()).await?;
    let draft = ExpenditureDraft {
        date: args.date(),
        description: shout(args.description()),
        amount: args.amount(),
        images,
    };
    let id = ExpenditureId::generate();

    let mut ledger = open(&config).await;
    let status = ledger
        .dispatch(Action::CreateExpenditure {
            id: id.clone(),
            draft,
        })
        .await?;
    ensure_saved(status)?;

    let created = ledger
        .state()
        .expenditure(&id)
        .cloned()
        .context("The new expenditure is missing from the ledger")?;
    Ok(Out::new(
        format!(
            "Added expenditure {} for {} ({})",
            created.id(),
            created.amount(),
            created.description()
        ),
        created,
    ))
}

/// Changes the given fields of an existing expenditure. Images given with `--image` are appended
/// after the existing ones, or replace them when `--clear-images` is set.
///
/// # Errors
/// - Returns an error if the id is unknown, an image cannot be read, the result has a blank
///   description or a zero amount, or if the ledger cannot be saved.
pub async fn expense_edit(config: Config, args: EditExpenseArgs) -> Result<Out<Expenditure>> {
    let id = ExpenditureId::new(args.id());
    let mut ledger = open(&config).await;
    let Some(existing) = ledger.state().expenditure(&id) else {
        return Err(Rejection::NoSuchExpenditure(id).into());
    };

    let mut draft = existing.to_draft();
    if let Some(date) = args.date() {
        draft.date = date;
    }
    if let Some(description) = args.description() {
        draft.description = shout(description);
    }
    if let Some(amount) = args.amount() {
        draft.amount = amount;
    }
    if args.clear_images() {
        draft.images.clear();
    }
    draft.images.extend(load_images(args.images()).await?);

    let status = ledger
        .dispatch(Action::UpdateExpenditure {
            id: id.clone(),
            draft,
        })
        .await?;
    ensure_saved(status)?;

    let updated = ledger
        .state()
        .expenditure(&id)
        .cloned()
        .context("The edited expenditure is missing from the ledger")?;
    Ok(Out::new(format!("Updated expenditure {id}"), updated))
}

/// Lists expenditures, most recent date first, optionally only those in one month.
pub async fn expense_list(config: Config, args: ListExpensesArgs) -> Result<Out<Vec<Expenditure>>> {
    let ledger = open(&config).await;
    let listed: Vec<Expenditure> = ledger
        .filtered_expenses(args.month())
        .into_iter()
        .cloned()
        .collect();
    if listed.is_empty() {
        return Ok(Out::new(
            format!("No expenditures for {}", args.month()),
            listed,
        ));
    }

    let total: Amount = listed.iter().map(Expenditure::amount).sum();
    let mut message = String::new();
    for e in &listed {
        message.push_str(&format!(
            "{}  {}  {:<32}  {:>12}  {}\n",
            e.id(),
            e.date(),
            e.description(),
            e.amount().to_string(),
            describe_images(e.images())
        ));
    }
    message.push_str(&format!(
        "{} expenditure(s) for {}, total {total}",
        listed.len(),
        args.month()
    ));
    Ok(Out::new(message, listed))
}

async fn load_images(paths: &[PathBuf]) -> Result<Vec<Voucher>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(Voucher::from_file(path).await?);
    }
    Ok(images)
}

fn describe_images(images: &[Voucher]) -> String {
    let described: Vec<String> = images
        .iter()
        .map(|v| match v.decode() {
            Ok((mime, bytes)) => format!("{mime} {}B", bytes.len()),
            Err(_) => v.as_str().to_string(),
        })
        .collect();
    if described.is_empty() {
        "no images".to_string()
    } else {
        described.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Month, MonthFilter};
    use crate::test::TestEnv;
    use crate::utils;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_expense_add_with_image() {
        let env = TestEnv::new().await;
        let image = env.scratch("receipt.jpg");
        utils::write(&image, [0xffu8, 0xd8, 0xff]).await.unwrap();

        let out = expense_add(
            env.config(),
            AddExpenseArgs::new(date(2024, 3, 9), "turf rent", Amount::from(1500), vec![image]),
        )
        .await
        .unwrap();
        let created = out.structure().unwrap();
        assert_eq!(created.description(), "TURF RENT");
        assert_eq!(created.images().len(), 1);
        assert_eq!(
            created.images()[0].decode().unwrap(),
            ("image/jpeg".to_string(), vec![0xff, 0xd8, 0xff])
        );

        let ledger = env.ledger().await;
        assert_eq!(ledger.state().expenditures()[0].id(), created.id());
    }

    #[tokio::test]
    async fn test_expense_add_rejects_blank_description() {
        let env = TestEnv::new().await;
        let result = expense_add(
            env.config(),
            AddExpenseArgs::new(date(2024, 3, 9), "   ", Amount::from(10), vec![]),
        )
        .await;
        assert!(result.is_err());
        assert!(env.ledger().await.state().expenditures().is_empty());
    }

    #[tokio::test]
    async fn test_expense_add_missing_image_changes_nothing() {
        let env = TestEnv::new().await;
        let result = expense_add(
            env.config(),
            AddExpenseArgs::new(
                date(2024, 3, 9),
                "X",
                Amount::from(10),
                vec![env.scratch("missing.png")],
            ),
        )
        .await;
        assert!(result.is_err());
        assert!(env.ledger().await.state().expenditures().is_empty());
    }

    #[tokio::test]
    async fn test_expense_edit() {
        let env = TestEnv::new().await;
        env.seed().await;
        let id = env.ledger().await.state().expenditures()[0]
            .id()
            .to_string();
        let logo = env.scratch("photo.png");
        utils::write(&logo, b"png").await.unwrap();

        let out = expense_edit(
            env.config(),
            EditExpenseArgs::new(&id)
                .with_date(date(2024, 2, 1))
                .with_amount(Amount::from(250))
                .with_image(&logo),
        )
        .await
        .unwrap();
        let updated = out.structure().unwrap();
        assert_eq!(updated.id().as_str(), id);
        assert_eq!(updated.description(), "TURF RENT");
        assert_eq!(updated.month(), Month::Feb);
        assert_eq!(updated.amount(), Amount::from(250));
        assert_eq!(updated.images().len(), 1);

        let out = expense_edit(env.config(), EditExpenseArgs::new(&id).with_clear_images())
            .await
            .unwrap();
        assert!(out.structure().unwrap().images().is_empty());
    }

    #[tokio::test]
    async fn test_expense_edit_unknown_id() {
        let env = TestEnv::new().await;
        env.seed().await;
        let err = expense_edit(
            env.config(),
            EditExpenseArgs::new("nope").with_description("x"),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("nope"), "{err}");
    }

    #[tokio::test]
    async fn test_expense_edit_to_zero_is_rejected() {
        let env = TestEnv::new().await;
        env.seed().await;
        let id = env.ledger().await.state().expenditures()[0]
            .id()
            .to_string();
        assert!(
            expense_edit(env.config(), EditExpenseArgs::new(&id).with_amount(Amount::ZERO))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_expense_list_filters_and_sorts() {
        let env = TestEnv::new().await;
        env.seed().await;
        for (d, what) in [(date(2024, 3, 1), "BALLS"), (date(2023, 1, 20), "NETS")] {
            expense_add(
                env.config(),
                AddExpenseArgs::new(d, what, Amount::from(10), vec![]),
            )
            .await
            .unwrap();
        }

        let out = expense_list(env.config(), ListExpensesArgs::new(MonthFilter::All))
            .await
            .unwrap();
        let all: Vec<_> = out
            .structure()
            .unwrap()
            .iter()
            .map(|e| e.description())
            .collect();
        assert_eq!(all, vec!["BALLS", "TURF RENT", "NETS"]);

        let out = expense_list(env.config(), ListExpensesArgs::new(Month::Jan.into()))
            .await
            .unwrap();
        let jan: Vec<_> = out
            .structure()
            .unwrap()
            .iter()
            .map(|e| e.description())
            .collect();
        assert_eq!(jan, vec!["TURF RENT", "NETS"]);
        assert!(out.message().ends_with("total 210"), "{}", out.message());

        let out = expense_list(env.config(), ListExpensesArgs::new(Month::Dec.into()))
            .await
            .unwrap();
        assert_eq!(out.message(), "No expenditures for Dec");
    }

    #[test]
    fn test_describe_images() {
        assert_eq!(describe_images(&[]), "no images");
        let images = [
            Voucher::from_bytes("image/png", [1u8, 2, 3]),
            Voucher::new("blobs/abc"),
        ];
        assert_eq!(describe_images(&images), "image/png 3B, blobs/abc");
    }
}
