//! Opaque image payloads: expenditure vouchers and the association logo.

use crate::Result;
use anyhow::{bail, Context};
use base64::Engine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// An opaque image payload such as a receipt photo or the association logo.
///
/// The ledger never looks inside a voucher. In the document it is stored as text, normally a
/// `data:` URI carrying the encoded bytes, but any reference string (for example a path into a
/// content-addressed store) is kept as-is. An empty voucher means "no image".
#[derive(
    Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Voucher(String);

impl Voucher {
    /// Wraps an existing payload, e.g. a data URI produced elsewhere.
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// Encodes raw bytes as a base64 `data:` URI with the given mime type.
    pub fn from_bytes(mime: &str, bytes: impl AsRef<[u8]>) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes.as_ref());
        Self(format!("{DATA_PREFIX}{mime}{BASE64_MARKER}{encoded}"))
    }

    /// Reads an image file and encodes it as a data URI. The mime type is taken from the file
    /// extension.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let mime = mime_for(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Unable to read image file {}", path.display()))?;
        Ok(Self::from_bytes(mime, bytes))
    }

    /// Decodes a base64 data URI back into its mime type and bytes.
    ///
    /// # Errors
    /// - Returns an error if the payload is not a base64 `data:` URI.
    pub fn decode(&self) -> Result<(String, Vec<u8>)> {
        let Some(rest) = self.0.strip_prefix(DATA_PREFIX) else {
            bail!("Voucher is not a data URI")
        };
        let Some((mime, encoded)) = rest.split_once(BASE64_MARKER) else {
            bail!("Voucher data URI is not base64 encoded")
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .context("Voucher data URI has invalid base64 content")?;
        Ok((mime.to_string(), bytes))
    }

    /// The stored payload text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload size in bytes as stored in the document.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn mime_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    Ok(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => bail!(
            "Unsupported image type for {}, expected png, jpg, gif, webp, svg or pdf",
            path.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_bytes_and_decode() {
        let voucher = Voucher::from_bytes("image/png", [0x89, b'P', b'N', b'G']);
        assert!(voucher.as_str().starts_with("data:image/png;base64,"));
        let (mime, bytes) = voucher.decode().unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_opaque_reference_is_kept() {
        let voucher = Voucher::new("blobs/ab/cdef0123");
        assert_eq!(voucher.as_str(), "blobs/ab/cdef0123");
        assert!(voucher.decode().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let voucher = Voucher::new("data:image/jpeg;base64,AAAA");
        let json = serde_json::to_string(&voucher).unwrap();
        assert_eq!(json, "\"data:image/jpeg;base64,AAAA\"");
        let back: Voucher = serde_json::from_str(&json).unwrap();
        assert_eq!(back, voucher);
    }

    #[test]
    fn test_empty() {
        assert!(Voucher::default().is_empty());
        assert!(!Voucher::new("x").is_empty());
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("receipt.JPG");
        tokio::fs::write(&path, b"jpegbytes").await.unwrap();
        let voucher = Voucher::from_file(&path).await.unwrap();
        let (mime, bytes) = voucher.decode().unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, b"jpegbytes");
    }

    #[tokio::test]
    async fn test_from_file_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();
        assert!(Voucher::from_file(&path).await.is_err());
    }
}
