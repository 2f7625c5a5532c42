use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the ledger home directory, its backups directory and an initial `config.json`.
///
/// The ledger document itself is created by the first change, so an existing ledger in
/// `ledger_home` is left alone.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(ledger_home: &Path) -> Result<Out<()>> {
    let config = Config::create(ledger_home)
        .await
        .context("Unable to create the ledger home directory and config")?;
    Ok(format!(
        "Successfully created the ledger home at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("books");
        let out = init(&home).await.unwrap();
        assert!(out.message().contains("books"));
        assert!(Config::load(&home).await.is_ok());
    }
}
