//! Moving the whole ledger in and out of export files.

use crate::aggregate::Totals;
use crate::args::{ExportArgs, ImportArgs};
use crate::backup::{EXPORT, PRE_IMPORT};
use crate::commands::{ensure_saved, open, Out};
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use std::path::PathBuf;
use tracing::debug;

/// Writes the whole ledger to `--out`, or to the configured export file name in the current
/// directory. A copy is also kept in the backups directory.
///
/// # Errors
/// - Returns an error if the saved ledger cannot be read, or if the export file or the backup
///   cannot be written.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let ledger = open(&config).await;
    if ledger.load_failed() {
        bail!(
            "The saved ledger at {} cannot be read, nothing was exported",
            config.store().path().display()
        )
    }
    let json = ledger.export()?;
    let path = match args.out() {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(config.export_file_name()),
    };
    utils::write(&path, &json).await?;

    let backup = config.backup().save_json(EXPORT, ledger.state()).await?;
    debug!("Export backup saved to {}", backup.display());

    let state = ledger.state();
    Ok(Out::new(
        format!(
            "Exported {} members and {} expenditures to {}",
            state.members().len(),
            state.expenditures().len(),
            path.display()
        ),
        path,
    ))
}

/// Replaces the whole ledger with the contents of an export file. The current ledger is saved
/// to the backups directory first. If the file is not a valid ledger nothing changes.
///
/// # Errors
/// - Returns an error if the file cannot be read or is not a valid ledger, if the backup cannot
///   be written, or if the imported ledger cannot be saved.
pub async fn import(config: Config, args: ImportArgs) -> Result<Out<Totals>> {
    let raw = utils::read(args.path()).await?;
    let mut ledger = open(&config).await;

    let backup = config
        .backup()
        .save_json(PRE_IMPORT, ledger.state())
        .await
        .context("Unable to back up the current ledger, nothing was imported")?;
    debug!("Pre-import backup saved to {}", backup.display());

    let status = ledger
        .import(&raw)
        .await
        .with_context(|| format!("Unable to import {}", args.path().display()))?;
    ensure_saved(status)?;

    let totals = ledger.totals();
    let state = ledger.state();
    Ok(Out::new(
        format!(
            "Imported {} members and {} expenditures, the previous ledger was saved to {}",
            state.members().len(),
            state.expenditures().len(),
            backup.display()
        ),
        totals,
    ))
}
