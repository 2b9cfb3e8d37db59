// Directory-backed blob store for uploaded presentation files.
//
// Blobs live flat under a configured root directory, keyed by sanitized
// filename. Re-uploading the same name overwrites the existing blob;
// callers get a warn log, not an error.

use crate::types::{ApiError, AppResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Extensions the upload endpoint accepts.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["pptx", "pdf"];

#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a blob under the root directory, creating the directory
    /// if absent, and returns the path it was stored at.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        if fs::try_exists(&path).await? {
            warn!("Overwriting existing upload: {}", name);
        }

        fs::write(&path, bytes).await?;
        debug!(size = bytes.len(), "Stored blob at {}", path.display());

        Ok(path)
    }

    pub async fn read(&self, name: &str) -> AppResult<Vec<u8>> {
        if name.is_empty() {
            return Err(ApiError::NotFound("File"));
        }

        match fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::NotFound("File")),
            Err(e) => Err(e.into()),
        }
    }
}

/// True when the filename carries an extension from the allowed set,
/// matched case-insensitively.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Reduces a client-supplied filename to something safe to join onto
/// the uploads directory: last path component only, ASCII alphanumerics
/// plus `.`, `-` and `_`, whitespace turned into underscores, leading
/// and trailing dots stripped.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut sanitized = String::with_capacity(base.len());
    for ch in base.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
            sanitized.push(ch);
        } else if ch.is_whitespace() {
            sanitized.push('_');
        }
    }

    sanitized.trim_matches('.').to_string()
}
