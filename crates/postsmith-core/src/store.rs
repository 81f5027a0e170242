//! Reading and writing post files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ErrorCode;

/// Failures reading or writing a post.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::DocumentReadFailed,
            Self::CreateDir { .. } | Self::Write { .. } => ErrorCode::DocumentWriteFailed,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::CreateDir { path, .. } | Self::Write { path, .. } => {
                path
            }
        }
    }
}

/// Where post text comes from and goes to.
pub trait DocumentStore {
    /// Read a whole post as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file is missing, unreadable, or
    /// not UTF-8.
    fn read(&self, path: &Path) -> Result<String, StoreError>;

    /// Replace a post's contents, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CreateDir`] or [`StoreError::Write`]. A failed
    /// write leaves any existing file intact.
    fn write(&self, path: &Path, text: &str) -> Result<(), StoreError>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl DocumentStore for FsStore {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_atomic(path, text.as_bytes()).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Write to a sibling temp file, then rename it over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_sibling(path);
    if let Err(err) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    debug!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "post".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}
