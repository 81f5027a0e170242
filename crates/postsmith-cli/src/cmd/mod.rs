//! Command handlers and the context they share.

pub mod authors;
pub mod completions;
pub mod config;
pub mod edit;
pub mod fields;
pub mod new;
pub mod show;

use std::path::{Path, PathBuf};

use postsmith_core::config::{EditorConfig, config_path, load_config, resolve_project_path};
use postsmith_core::roster::{AuthorMatch, AuthorRoster};
use postsmith_core::session::{Generated, PostLayout, SessionError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::output::{CliError, OutputMode, fail, pretty_kv, render};

/// Loaded configuration plus the resolved project root.
#[derive(Debug)]
pub struct Context {
    pub output: OutputMode,
    pub config: EditorConfig,
    pub config_path: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl Context {
    /// Load config and resolve the project root from `--project`, the
    /// environment, and the config file, in that order.
    pub fn load(project_flag: Option<&Path>, output: OutputMode) -> anyhow::Result<Self> {
        let config_path = config_path();
        let config = match config_path.as_deref() {
            Some(path) => load_config(path)
                .map_err(|err| fail(output, CliError::from_code(err.code(), err.to_string())))?,
            None => EditorConfig::default(),
        };
        let project = resolve_project_path(project_flag, &config);
        debug!(
            config = ?config_path,
            project = ?project,
            "context resolved"
        );
        Ok(Self {
            output,
            config,
            config_path,
            project,
        })
    }

    pub fn layout(&self) -> PostLayout {
        PostLayout::from_config(&self.config)
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project.as_deref()
    }

    /// The project's author roster. Problems reading it are logged and
    /// yield an empty roster; they never block an edit.
    pub fn roster(&self) -> AuthorRoster {
        let Some(root) = self.project_root() else {
            return AuthorRoster::default();
        };
        let path = self.config.layout.authors_file_in(root);
        AuthorRoster::load(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "ignoring unreadable author roster");
            AuthorRoster::default()
        })
    }

    /// Render a session failure and return it as the command's error.
    pub fn session_error(&self, err: &SessionError) -> anyhow::Error {
        fail(self.output, CliError::from_code(err.code(), err.to_string()))
    }
}

/// What `new` and `edit` report after writing a post.
#[derive(Debug, Serialize)]
pub struct WriteReport {
    pub action: &'static str,
    pub path: PathBuf,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlisted_author: Option<String>,
}

impl WriteReport {
    pub fn new(generated: &Generated, warnings: Vec<String>, roster: &AuthorRoster, author: &str) -> Self {
        let author = author.trim();
        let unlisted_author = (!author.is_empty()
            && !roster.is_empty()
            && roster.resolve(author) == AuthorMatch::Unlisted)
            .then(|| author.to_string());
        if let Some(name) = &unlisted_author {
            warn!(author = %name, "author is not on the roster");
        }
        Self {
            action: generated.mode.action_label(),
            path: generated.path.clone(),
            warnings,
            unlisted_author,
        }
    }

    pub fn render(&self, output: OutputMode) -> anyhow::Result<()> {
        render(output, self, |report, w| {
            let verb = if report.action == "create" { "created" } else { "updated" };
            writeln!(w, "✓ {verb} {}", report.path.display())?;
            for warning in &report.warnings {
                pretty_kv(w, "warning", warning)?;
            }
            if let Some(name) = &report.unlisted_author {
                pretty_kv(w, "note", format!("author `{name}` is not on the roster"))?;
            }
            Ok(())
        })
    }
}
