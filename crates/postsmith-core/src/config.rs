use std::env;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::BodySeparator;
use crate::encode::UtcOffset;
use crate::error::ErrorCode;
use crate::slug::{CharRange, SlugRules};
use crate::store::write_atomic;

/// Environment variable that overrides the configured project path.
pub const PROJECT_ENV: &str = "POSTSMITH_PROJECT";

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "POSTSMITH_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Serialize(_) | Self::Write { .. } => ErrorCode::ConfigWriteFailed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Root of the blog project (the directory holding `_posts/`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    #[serde(default)]
    pub front_matter: FrontMatterConfig,
    #[serde(default)]
    pub slug: SlugConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatterConfig {
    #[serde(default)]
    pub utc_offset: UtcOffset,
    #[serde(default)]
    pub body_separator: BodySeparator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugConfig {
    #[serde(default = "default_keep_ranges")]
    pub keep_ranges: Vec<CharRange>,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            keep_ranges: default_keep_ranges(),
        }
    }
}

impl SlugConfig {
    #[must_use]
    pub fn rules(&self) -> SlugRules {
        SlugRules::new(self.keep_ranges.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_posts_dir")]
    pub posts_dir: PathBuf,
    #[serde(default = "default_authors_file")]
    pub authors_file: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
            authors_file: default_authors_file(),
        }
    }
}

impl LayoutConfig {
    #[must_use]
    pub fn authors_file_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.authors_file)
    }
}

fn default_keep_ranges() -> Vec<CharRange> {
    vec![CharRange::CJK]
}

fn default_posts_dir() -> PathBuf {
    PathBuf::from("_posts")
}

fn default_authors_file() -> PathBuf {
    PathBuf::from("_data/authors.yml")
}

/// `<config dir>/postsmith/config.toml`, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("postsmith").join("config.toml"))
}

/// Load config from `path`. A missing file yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    if !path.exists() {
        return Ok(EditorConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<EditorConfig>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The config file in effect: `POSTSMITH_CONFIG` if set, else
/// [`user_config_path`].
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .or_else(user_config_path)
}

/// Write `config` to `path`, creating the directory first.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] or [`ConfigError::Write`].
pub fn save_config(path: &Path, config: &EditorConfig) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_atomic(path, content.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick the project root: CLI flag, then `POSTSMITH_PROJECT`, then config.
#[must_use]
pub fn resolve_project_path(cli: Option<&Path>, config: &EditorConfig) -> Option<PathBuf> {
    let env_path = env::var_os(PROJECT_ENV).map(PathBuf::from);
    resolve_project_path_inner(cli, env_path, config.project_path.clone())
}

fn resolve_project_path_inner(
    cli: Option<&Path>,
    env_path: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Option<PathBuf> {
    cli.map(Path::to_path_buf)
        .or(env_path)
        .or(configured)
        .filter(|path| !path.as_os_str().is_empty())
}
