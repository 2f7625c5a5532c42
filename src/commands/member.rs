//! Member command handlers.

use crate::action::{Action, Rejection};
use crate::aggregate::member_total;
use crate::args::{AddMemberArgs, RemoveMemberArgs, RenameMemberArgs};
use crate::commands::{ensure_saved, open, shout, Out};
use crate::model::{Amount, AppState};
use crate::{Config, Result};
use serde::Serialize;

/// A member as listed on the command line.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRow {
    /// The position used to refer to the member in other commands.
    pub index: usize,
    pub name: String,
    /// Everything the member has paid.
    pub paid: Amount,
}

/// Lists the members in name order along with what each has paid.
pub async fn member_list(config: Config) -> Result<Out<Vec<MemberRow>>> {
    let ledger = open(&config).await;
    let rows = rows(ledger.state());
    if rows.is_empty() {
        return Ok(Out::new("There are no members yet", rows));
    }
    Ok(Out::new(render(&rows), rows))
}

/// Adds a member. The name is stored in upper case.
///
/// # Errors
/// - Returns an error if the name is blank or already taken, or if the ledger cannot be saved.
pub async fn member_add(config: Config, args: AddMemberArgs) -> Result<Out<Vec<MemberRow>>> {
    let name = shout(args.name());
    let mut ledger = open(&config).await;
    let status = ledger
        .dispatch(Action::AddMember { name: name.clone() })
        .await?;
    ensure_saved(status)?;
    let rows = rows(ledger.state());
    Ok(Out::new(format!("Added member {name}"), rows))
}

/// Renames the member at `index`. Members are re-sorted afterwards, so indexes may change.
///
/// # Errors
/// - Returns an error if the index is out of range, the name is blank or taken by another
///   member, or if the ledger cannot be saved.
pub async fn member_rename(config: Config, args: RenameMemberArgs) -> Result<Out<Vec<MemberRow>>> {
    let name = shout(args.name());
    let mut ledger = open(&config).await;
    let old = ledger
        .state()
        .members()
        .get(args.index())
        .map(|m| m.name().to_string());
    let status = ledger
        .dispatch(Action::RenameMember {
            index: args.index(),
            name: name.clone(),
        })
        .await?;
    ensure_saved(status)?;
    let rows = rows(ledger.state());
    Ok(Out::new(
        format!("Renamed {} to {name}", old.unwrap_or_default()),
        rows,
    ))
}

/// Removes the member at `index` together with their whole payment history. Nothing happens
/// unless `--yes` was given.
///
/// # Errors
/// - Returns an error if the index is out of range or if the ledger cannot be saved.
pub async fn member_remove(config: Config, args: RemoveMemberArgs) -> Result<Out<Vec<MemberRow>>> {
    let mut ledger = open(&config).await;
    let members = ledger.state().members();
    let Some(member) = members.get(args.index()) else {
        return Err(Rejection::NoSuchMember {
            index: args.index(),
            count: members.len(),
        }
        .into());
    };
    let name = member.name().to_string();
    if !args.yes() {
        return Ok(Out::new(
            format!(
                "Not removing {name}, this deletes all of their payments. Run again with --yes \
                to confirm."
            ),
            rows(ledger.state()),
        ));
    }
    let status = ledger
        .dispatch(Action::RemoveMember {
            index: args.index(),
        })
        .await?;
    ensure_saved(status)?;
    Ok(Out::new(format!("Removed {name}"), rows(ledger.state())))
}

fn rows(state: &AppState) -> Vec<MemberRow> {
    state
        .members()
        .iter()
        .enumerate()
        .map(|(index, m)| MemberRow {
            index,
            name: m.name().to_string(),
            paid: member_total(m),
        })
        .collect()
}

fn render(rows: &[MemberRow]) -> String {
    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    let mut out = format!("{:>3}  {:<width$}  {:>12}", "#", "NAME", "PAID");
    for row in rows {
        out.push_str(&format!(
            "\n{:>3}  {:<width$}  {:>12}",
            row.index,
            row.name,
            row.paid.to_string()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::utils;

    #[tokio::test]
    async fn test_member_add_keeps_an_unreadable_ledger() {
        let env = TestEnv::new().await;
        let path = env.config().store().path().to_path_buf();
        let original = r#"{ "members": [ { "name": "A" }, { "name": "B" } ], "expenditures": [
            { "id": "x1", "date": "", "description": "RENT", "amount": 200 } ] }"#;
        utils::write(&path, original).await.unwrap();

        member_add(env.config(), AddMemberArgs::new("c")).await.unwrap();

        let mut kept = Vec::new();
        let mut entries = utils::read_dir(env.config().root()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with("current_state.unreadable.")
            {
                kept.push(utils::read(&entry.path()).await.unwrap());
            }
        }
        assert_eq!(kept, vec![original.to_string()]);
        assert_eq!(env.ledger().await.state().members()[0].name(), "C");
    }

    #[tokio::test]
    async fn test_member_add_sorts_and_uppercases() {
        let env = TestEnv::new().await;
        member_add(env.config(), AddMemberArgs::new("zed"))
            .await
            .unwrap();
        let out = member_add(env.config(), AddMemberArgs::new(" amy "))
            .await
            .unwrap();
        let names: Vec<_> = out
            .structure()
            .unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["AMY", "ZED"]);
    }

    #[tokio::test]
    async fn test_member_add_duplicate_fails() {
        let env = TestEnv::new().await;
        env.seed().await;
        let err = member_add(env.config(), AddMemberArgs::new("Amy"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"), "{err}");
    }

    #[tokio::test]
    async fn test_member_list() {
        let env = TestEnv::new().await;
        let out = member_list(env.config()).await.unwrap();
        assert!(out.structure().unwrap().is_empty());

        env.seed().await;
        let out = member_list(env.config()).await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "AMY");
        assert_eq!(rows[0].paid, Amount::from(600));
        assert_eq!(rows[1].paid, Amount::ZERO);
        assert!(out.message().contains("AMY"));
    }

    #[tokio::test]
    async fn test_member_rename_keeps_payments() {
        let env = TestEnv::new().await;
        env.seed().await;
        let out = member_rename(env.config(), RenameMemberArgs::new(0, "zoe"))
            .await
            .unwrap();
        assert_eq!(out.message(), "Renamed AMY to ZOE");
        let rows = out.structure().unwrap();
        // ZED now sorts before ZOE
        assert_eq!(rows[1].name, "ZOE");
        assert_eq!(rows[1].paid, Amount::from(600));
    }

    #[tokio::test]
    async fn test_member_remove_requires_yes() {
        let env = TestEnv::new().await;
        env.seed().await;
        let out = member_remove(env.config(), RemoveMemberArgs::new(0, false))
            .await
            .unwrap();
        assert!(out.message().contains("--yes"));
        assert_eq!(env.ledger().await.state().members().len(), 2);

        let out = member_remove(env.config(), RemoveMemberArgs::new(0, true))
            .await
            .unwrap();
        assert_eq!(out.message(), "Removed AMY");
        let ledger = env.ledger().await;
        assert_eq!(ledger.state().members().len(), 1);
        assert_eq!(ledger.totals().income, Amount::ZERO);
    }

    #[tokio::test]
    async fn test_member_remove_bad_index() {
        let env = TestEnv::new().await;
        env.seed().await;
        assert!(member_remove(env.config(), RemoveMemberArgs::new(9, true))
            .await
            .is_err());
    }
}
