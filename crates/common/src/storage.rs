//! Storage abstraction for ticket documents.
//!
//! Keys are `<ticket>/<stored name>` and are resolved against a base
//! directory on the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{AppError, AppResult};

/// Metadata for an object that has been written.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Storage key (`<ticket>/<stored name>`).
    pub key: String,
    /// Public URL path for the object.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write an object.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<StoredObject>;

    /// Read an object, `None` if it does not exist.
    async fn read(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    /// Delete an object. Missing objects are ignored.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self { base_path, base_url }
    }

    /// Root directory objects are written under.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if !key.split('/').all(is_safe_segment) {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<StoredObject> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn read(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read file: {e}"))),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Whether `segment` can be used as a single path component.
///
/// Only ASCII letters, digits, `-`, `_` and `.` are accepted, and the
/// segment may not start with a dot.
#[must_use]
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= 255
        && !segment.starts_with('.')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Build a collision-resistant stored name: `<field>-<millis>-<suffix>.<extension>`.
///
/// The extension is lower-cased. An empty or non-alphanumeric extension is
/// left off.
#[must_use]
pub fn generate_stored_name(field: &str, extension: &str, suffix: u32) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();

    let field: String = field
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    let field = if field.is_empty() { "file".to_string() } else { field };

    let extension = Some(extension)
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{field}-{timestamp}-{suffix}{extension}")
}

/// Lower-cased extension of `name`, if it has one.
#[must_use]
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Content type for a stored file, guessed from its extension.
#[must_use]
pub fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string()
}
