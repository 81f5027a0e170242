//! The project's author roster (`_data/authors.yml`).
//!
//! The roster is a YAML mapping keyed by author name; the values are free
//! for the site theme to use and are ignored here. Names typed by the user
//! that are not on the roster are still accepted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info};

use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read author roster {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("author roster is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("author roster should be a mapping keyed by author name")]
    NotAMapping,
}

impl RosterError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::DocumentReadFailed,
            Self::Parse(_) | Self::NotAMapping => ErrorCode::RosterParseError,
        }
    }
}

/// Whether an author name is on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorMatch {
    Listed,
    Unlisted,
}

/// Known author names in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRoster {
    names: Vec<String>,
}

impl AuthorRoster {
    /// Parse roster YAML. An empty document is an empty roster.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Parse`] for malformed YAML and
    /// [`RosterError::NotAMapping`] for any other top-level shape.
    pub fn from_yaml(text: &str) -> Result<Self, RosterError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_yaml::from_str(text)?;
        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            _ => return Err(RosterError::NotAMapping),
        };
        let names = mapping
            .keys()
            .filter_map(|key| match key {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect();
        Ok(Self { names })
    }

    /// Load the roster at `path`. A missing file is an empty roster.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no author roster found");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(RosterError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let roster = Self::from_yaml(&text)?;
        debug!(authors = roster.len(), "author roster loaded");
        Ok(roster)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> AuthorMatch {
        if self.contains(name.trim()) {
            AuthorMatch::Listed
        } else {
            AuthorMatch::Unlisted
        }
    }
}
