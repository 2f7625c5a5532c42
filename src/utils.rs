use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Write a file so that, at every moment, `path` holds either the old contents or the new
/// contents in full. The data is written to a sibling temporary file, flushed to disk, then
/// renamed over `path`.
pub(crate) async fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    let tmp = tmp_path(path);
    if let Err(e) = write_synced(&tmp, contents.as_ref()).await {
        // Leave no stray temp file behind, the original is still intact
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

async fn write_synced(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Unable to create {}", path.display()))?;
    file.write_all(contents)
        .await
        .with_context(|| format!("Unable to write to {}", path.display()))?;
    file.sync_all()
        .await
        .with_context(|| format!("Unable to flush {} to disk", path.display()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Copy a file, replacing `to` if it exists.
pub(crate) async fn copy(from: &Path, to: &Path) -> Result<()> {
    tokio::fs::copy(from, to).await.with_context(|| {
        format!(
            "Unable to copy '{}' to '{}'",
            from.to_string_lossy(),
            to.to_string_lossy()
        )
    })?;
    Ok(())
}

/// Read a file to a `String`.
pub async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub async fn deserialize<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Basically move a file. Renames `from` -> `to`.
pub async fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    tokio::fs::rename(from.as_ref(), to.as_ref())
        .await
        .with_context(|| {
            format!(
                "Unable to move file from '{}' to '{}'",
                from.as_ref().to_string_lossy(),
                to.as_ref().to_string_lossy()
            )
        })
}

/// Create a directory and all of its parents.
pub(crate) async fn make_dir(p: &Path) -> Result<()> {
    tokio::fs::create_dir_all(p)
        .await
        .with_context(|| format!("Unable to create directory at {}", p.to_string_lossy()))
}

pub(crate) async fn canonicalize(p: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(p)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", p.to_string_lossy()))
}

pub(crate) async fn read_dir(p: &Path) -> Result<tokio::fs::ReadDir> {
    tokio::fs::read_dir(p)
        .await
        .with_context(|| format!("Unable to read directory {}", p.to_string_lossy()))
}

pub(crate) async fn remove(p: &Path) -> Result<()> {
    tokio::fs::remove_file(p)
        .await
        .with_context(|| format!("Unable to remove file {}", p.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        write_atomic(&path, "first").await.unwrap();
        write_atomic(&path, "second").await.unwrap();
        assert_eq!(read(&path).await.unwrap(), "second");
        assert!(!dir.path().join("doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_atomic_missing_dir_fails_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("doc.json");
        assert!(write_atomic(&path, "x").await.is_err());
        assert!(!path.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_write_atomic_full_disk_leaves_no_temp_file() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        write_atomic(&path, "first").await.unwrap();

        // Every write to /dev/full fails with "no space left on device"
        let tmp = dir.path().join("doc.json.tmp");
        std::os::unix::fs::symlink(full, &tmp).unwrap();
        assert!(write_atomic(&path, "second").await.is_err());
        assert!(tokio::fs::symlink_metadata(&tmp).await.is_err());
        assert_eq!(read(&path).await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_deserialize() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.json");
        write(&path, "[1, 2, 3]").await.unwrap();
        let v: Vec<u32> = deserialize(&path).await.unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }
}
