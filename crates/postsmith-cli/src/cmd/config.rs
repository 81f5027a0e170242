//! `postsmith config`: inspect the config in effect or remember a project.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Subcommand};
use postsmith_core::config::{EditorConfig, save_config};
use postsmith_core::error::ErrorCode;
use serde::Serialize;
use tracing::info;

use super::Context;
use crate::output::{CliError, fail, pretty_kv, render};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show the config file location, resolved project, and settings
    Show,
    /// Remember PATH as the blog project root
    SetProject {
        /// Blog project root (the directory holding `_posts/`)
        path: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    config_path: Option<&'a Path>,
    project: Option<&'a Path>,
    config: &'a EditorConfig,
}

pub fn run_config(args: &ConfigArgs, ctx: &Context) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommand::Show => run_show(ctx),
        ConfigCommand::SetProject { path } => run_set_project(path, ctx),
    }
}

fn run_show(ctx: &Context) -> anyhow::Result<()> {
    let report = ConfigReport {
        config_path: ctx.config_path.as_deref(),
        project: ctx.project_root(),
        config: &ctx.config,
    };
    let settings = toml::to_string_pretty(&ctx.config).context("failed to format config")?;
    render(ctx.output, &report, |report, w| {
        pretty_kv(w, "config", display_or_none(report.config_path))?;
        pretty_kv(w, "project", display_or_none(report.project))?;
        writeln!(w)?;
        write!(w, "{settings}")
    })
}

fn run_set_project(path: &Path, ctx: &Context) -> anyhow::Result<()> {
    let Some(config_path) = ctx.config_path.as_deref() else {
        return Err(fail(
            ctx.output,
            CliError::from_code(
                ErrorCode::ConfigWriteFailed,
                "no config directory on this platform; set POSTSMITH_CONFIG",
            ),
        ));
    };
    let project = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(path)
    };

    let config = EditorConfig {
        project_path: Some(project.clone()),
        ..ctx.config.clone()
    };
    save_config(config_path, &config)
        .map_err(|err| fail(ctx.output, CliError::from_code(err.code(), err.to_string())))?;
    info!(project = %project.display(), "project path saved");

    let report = ConfigReport {
        config_path: Some(config_path),
        project: Some(&project),
        config: &config,
    };
    render(ctx.output, &report, |report, w| {
        writeln!(
            w,
            "✓ project set to {} in {}",
            display_or_none(report.project),
            display_or_none(report.config_path)
        )
    })
}

fn display_or_none(path: Option<&Path>) -> String {
    path.map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
}
