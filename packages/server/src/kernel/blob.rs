//! Local-disk blob storage for page images.
//!
//! Objects live under `root/<key>` and are served publicly at
//! `public_base_url/<key>` (the router mounts `root` at `/uploads`).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use super::BaseBlobStorage;

pub struct LocalBlobStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Object key for a URL this storage produced, `None` for anything else.
    pub fn object_key_from_url(&self, url: &str) -> Option<String> {
        object_key_from_url(&self.public_base_url, url)
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.split('/').any(|seg| seg == ".." || seg.is_empty()) {
            anyhow::bail!("Invalid object key: {}", key);
        }
        Ok(self.root.join(key))
    }
}

/// Strip `base_url/` from `url`. Query strings and fragments are dropped.
pub fn object_key_from_url(base_url: &str, url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let rest = url.strip_prefix(base)?.strip_prefix('/')?;
    let key = rest.split(['?', '#']).next().unwrap_or_default();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl BaseBlobStorage for LocalBlobStorage {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str, file_name: &str) -> Result<String> {
        let key = format!("fairytales/{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(key = %key, content_type, size = bytes.len(), "Stored blob");
        Ok(self.public_url(&key))
    }

    async fn delete(&self, key_or_url: &str) -> Result<()> {
        let key = if key_or_url.contains("://") {
            match self.object_key_from_url(key_or_url) {
                Some(key) => key,
                None => {
                    warn!(url = %key_or_url, "Not a URL from this storage, skipping delete");
                    return Ok(());
                }
            }
        } else {
            key_or_url.to_string()
        };

        let path = self.resolve(&key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}
