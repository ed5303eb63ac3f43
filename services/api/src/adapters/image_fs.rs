//! services/api/src/adapters/image_fs.rs
//!
//! This module contains the local-disk image adapter, which is the concrete
//! implementation of the `ImageStorage` port from the `core` crate.

use async_trait::async_trait;
use catalog_core::ports::{ImageStorage, PortError, PortResult};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Stores uploaded images as files under a root directory that is served
/// publicly at `public_prefix`.
#[derive(Clone, Debug)]
pub struct LocalImageStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalImageStorage {
    /// Creates a new `LocalImageStorage`.
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            root: root.into(),
            public_prefix: format!("/{}", public_prefix.trim_matches('/')),
        }
    }

    /// Creates the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Maps a storage-relative reference to a file directly inside the root.
    /// References outside our prefix, or with path components, map to nothing.
    fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let with_slash = if reference.starts_with('/') {
            reference.to_string()
        } else {
            format!("/{reference}")
        };
        let file_name = with_slash
            .strip_prefix(&self.public_prefix)?
            .strip_prefix('/')?;
        let is_plain_name = !file_name.is_empty()
            && file_name != "."
            && file_name != ".."
            && !file_name.contains(['/', '\\']);
        is_plain_name.then(|| self.root.join(file_name))
    }
}

/// `product-<millis>-<random>.<ext>`, keeping the original extension when it is sane.
fn unique_file_name(suggested_name: &str) -> String {
    let extension = Path::new(suggested_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!(
        "product-{}-{}{}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>() % 1_000_000_000,
        extension
    )
}

//=========================================================================================
// `ImageStorage` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> PortResult<String> {
        let file_name = unique_file_name(suggested_name);
        tokio::fs::write(self.root.join(&file_name), bytes)
            .await
            .map_err(|e| PortError::Unexpected(format!("failed to write image {file_name}: {e}")))?;
        Ok(format!("{}/{}", self.public_prefix, file_name))
    }

    async fn delete(&self, reference: &str) -> PortResult<bool> {
        let Some(path) = self.path_for(reference) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PortError::Unexpected(format!(
                "failed to delete image {}: {e}",
                path.display()
            ))),
        }
    }
}
