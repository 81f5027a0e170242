//! `postsmith show`: decode a post's front matter without changing it.

use std::path::{Path, PathBuf};

use clap::Args;
use postsmith_core::decode::DecodeWarning;
use postsmith_core::document::split;
use postsmith_core::record::{FieldRecord, Timestamp};
use postsmith_core::session::Session;
use postsmith_core::store::FsStore;
use serde::Serialize;

use super::Context;
use crate::output::{pretty_kv, pretty_section, render};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Post file to read.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ShowReport<'a> {
    path: &'a Path,
    has_metadata: bool,
    record: &'a FieldRecord,
    warnings: Vec<String>,
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let now = Timestamp::now();
    let mut session = Session::new(now);
    let warnings = session
        .load(&FsStore, &args.file, now)
        .map_err(|err| ctx.session_error(&err))?;
    let has_metadata = session
        .document()
        .is_some_and(|doc| split(doc.original()).has_metadata());

    let report = ShowReport {
        path: &args.file,
        has_metadata,
        record: session.record(),
        warnings: warnings.iter().map(DecodeWarning::to_string).collect(),
    };

    render(ctx.output, &report, |report, w| {
        pretty_section(w, &report.path.display().to_string())?;
        let record = report.record;
        pretty_kv(w, "title", &record.title)?;
        pretty_kv(w, "date", record.timestamp.to_string())?;
        pretty_kv(w, "categories", record.categories.as_slice().join(", "))?;
        pretty_kv(w, "tags", record.tags.to_text())?;
        pretty_kv(w, "author", &record.author)?;
        let mut lines = record.description.lines();
        pretty_kv(w, "description", lines.next().unwrap_or_default())?;
        for line in lines {
            pretty_kv(w, "", line)?;
        }
        if !report.has_metadata {
            pretty_kv(w, "note", "no front matter; showing defaults")?;
        }
        for warning in &report.warnings {
            pretty_kv(w, "warning", warning)?;
        }
        Ok(())
    })
}
