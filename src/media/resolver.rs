//! Resource resolution
//!
//! Maps an opaque identifier to an existing file under the media root, with a single-level
//! fallback to a sample resource.

use super::error::MediaError;
use crate::http::mime;
use std::path::{Path, PathBuf};
use tokio::fs;

const MAX_IDENTIFIER_LEN: usize = 128;

/// A resolved, existing media file. Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResource {
    /// Identifier as requested by the client
    pub id: String,
    pub path: PathBuf,
    pub size: u64,
    pub content_type: &'static str,
    /// True when the sample resource stands in for a missing one
    pub is_fallback: bool,
}

/// Resolves identifiers under a fixed root directory
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    extension: String,
    fallback: Option<PathBuf>,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            fallback: None,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, sample: impl Into<PathBuf>) -> Self {
        self.fallback = Some(sample.into());
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path the identifier maps to, without touching the filesystem
    pub fn candidate_path(&self, id: &str) -> Result<PathBuf, MediaError> {
        validate_identifier(id)?;
        Ok(self.root.join(format!("{id}.{}", self.extension)))
    }

    /// Resolve an identifier to an existing file
    ///
    /// Tries `<root>/<id>.<extension>` first, then the fallback sample if configured.
    pub async fn resolve(&self, id: &str) -> Result<MediaResource, MediaError> {
        let primary = self.candidate_path(id)?;

        if let Some(size) = regular_file_size(&primary).await {
            return Ok(build_resource(id, &primary, size, false).await);
        }

        if let Some(sample) = &self.fallback {
            if let Some(size) = regular_file_size(sample).await {
                tracing::debug!(
                    id,
                    sample = %sample.display(),
                    "requested media missing, serving sample"
                );
                return Ok(build_resource(id, sample, size, true).await);
            }
        }

        Err(MediaError::NotFound(id.to_string()))
    }
}

/// Reject identifiers that could leave the media root
///
/// Only `[A-Za-z0-9._-]` is accepted, and `..` is refused even though both dots are legal
/// on their own.
pub fn validate_identifier(id: &str) -> Result<(), MediaError> {
    let well_formed = !id.is_empty()
        && id.len() <= MAX_IDENTIFIER_LEN
        && !id.contains("..")
        && !id.starts_with('.')
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));

    if well_formed {
        Ok(())
    } else {
        tracing::warn!(id, "rejected media identifier");
        Err(MediaError::InvalidIdentifier(id.to_string()))
    }
}

/// Size of `path` if it exists and is a regular file
async fn regular_file_size(path: &Path) -> Option<u64> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        _ => None,
    }
}

async fn build_resource(id: &str, path: &Path, size: u64, is_fallback: bool) -> MediaResource {
    let absolute = fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf());
    let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));

    MediaResource {
        id: id.to_string(),
        path: absolute,
        size,
        content_type,
        is_fallback,
    }
}
