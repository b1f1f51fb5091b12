//! Local image storage for uploaded record artwork.
//!
//! Files live under one directory and are referenced by `<public_prefix>/<file>`.
//! Only references under the prefix are treated as managed; remote artwork URLs
//! from seed data are never touched.

use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const FALLBACK_FILE_NAME: &str = "image";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

/// Strip every character outside `[A-Za-z0-9._-]` and any leading dots.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let cleaned = UNSAFE_CHARS.replace_all(base, "");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct ImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Self {
        ImageStore {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Write `data` under a unique name and return its public reference.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let file_name = format!(
            "{}-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        );
        tokio::fs::write(self.root.join(&file_name), data).await?;
        tracing::debug!(file = %file_name, bytes = data.len(), "image stored");
        Ok(format!("{}/{}", self.public_prefix, file_name))
    }

    /// Map a managed public reference back to its file. `None` for anything else.
    fn managed_path(&self, reference: &str) -> Option<PathBuf> {
        let file = reference.strip_prefix(&self.public_prefix)?.strip_prefix('/')?;
        if file.is_empty() || file.contains('/') || file.contains('\\') || file.starts_with('.') {
            return None;
        }
        Some(self.root.join(file))
    }

    pub fn is_managed(&self, reference: &str) -> bool {
        self.managed_path(reference).is_some()
    }

    /// Delete a managed image. Missing files are ignored, other IO errors logged.
    pub async fn remove_if_managed(&self, reference: Option<&str>) {
        let Some(path) = reference.and_then(|r| self.managed_path(r)) else {
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "image removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove image"),
        }
    }
}
