//! `postsmith authors`: list the project's author roster.

use postsmith_core::error::ErrorCode;
use postsmith_core::roster::AuthorRoster;
use serde::Serialize;

use super::Context;
use crate::output::{CliError, fail, render};

#[derive(Debug, Serialize)]
struct AuthorsReport<'a> {
    authors: &'a [String],
}

pub fn run_authors(ctx: &Context) -> anyhow::Result<()> {
    let Some(root) = ctx.project_root() else {
        return Err(fail(
            ctx.output,
            CliError::from_code(ErrorCode::MissingProjectPath, "blog project path is not set"),
        ));
    };
    let path = ctx.config.layout.authors_file_in(root);
    let roster = AuthorRoster::load(&path)
        .map_err(|err| fail(ctx.output, CliError::from_code(err.code(), err.to_string())))?;

    render(ctx.output, &AuthorsReport { authors: roster.names() }, |report, w| {
        if report.authors.is_empty() {
            writeln!(w, "no authors in {}", path.display())?;
        }
        for name in report.authors {
            writeln!(w, "{name}")?;
        }
        Ok(())
    })
}
