//! Object keys for uploaded photos.

use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// How an uploaded photo's object key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhotoKeyScheme {
    /// The file's own name. Capture names carry a second-resolution
    /// timestamp plus a random suffix.
    #[default]
    FileName,
    /// SHA-256 of the file contents (first 16 bytes, hex) plus the file's
    /// extension. Identical photos share one object.
    ContentHash,
}

impl PhotoKeyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKeyScheme::FileName => "file-name",
            PhotoKeyScheme::ContentHash => "content-hash",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "file-name" => Some(PhotoKeyScheme::FileName),
            "content-hash" => Some(PhotoKeyScheme::ContentHash),
            _ => None,
        }
    }

    /// Derive the object key for the photo at `path`.
    pub async fn key_for(&self, path: &Path) -> io::Result<String> {
        match self {
            PhotoKeyScheme::FileName => file_name(path),
            PhotoKeyScheme::ContentHash => {
                let data = tokio::fs::read(path).await?;
                let digest = Sha256::digest(&data);
                let hash = hex::encode(&digest[..16]);
                Ok(match path.extension() {
                    Some(ext) => format!("{}.{}", hash, ext.to_string_lossy()),
                    None => hash,
                })
            }
        }
    }
}

fn file_name(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Photo path has no file name: {}", path.display()),
            )
        })
}
