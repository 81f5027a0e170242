//! Field flags shared by `new` and `edit`.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use postsmith_core::error::ErrorCode;
use postsmith_core::keywords::KeywordError;
use postsmith_core::record::{Categories, FieldRecord, Tags, parse_date, parse_time};
use postsmith_core::session::Session;

use crate::keywords::CommandKeywords;
use crate::output::{CliError, OutputMode, fail};

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Post title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// Post date.
    #[arg(long, value_name = "yyyy-M-d")]
    pub date: Option<String>,

    /// Post time of day.
    #[arg(long, value_name = "HH:MM:SS")]
    pub time: Option<String>,

    /// Primary category. An empty value clears it.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Secondary category. An empty value clears it.
    #[arg(long)]
    pub subcategory: Option<String>,

    /// Tags separated by spaces or commas.
    #[arg(long)]
    pub tags: Option<String>,

    /// Author name. Names not on the roster are accepted with a note.
    #[arg(short, long)]
    pub author: Option<String>,

    /// Description; may span several lines.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Replace the body with the contents of this file.
    #[arg(long, value_name = "FILE")]
    pub body_file: Option<PathBuf>,

    /// Replace tags with keywords printed by this program. It receives an
    /// instruction and the start of the body on stdin.
    #[arg(long, value_name = "PROGRAM")]
    pub suggest_tags: Option<PathBuf>,
}

impl FieldArgs {
    /// Apply the given overrides to `record`. Fields not given keep their
    /// value.
    pub fn apply(&self, record: &mut FieldRecord) -> Result<(), CliError> {
        if let Some(title) = &self.title {
            record.title.clone_from(title);
        }
        if let Some(text) = &self.date {
            let date = parse_date(text.trim()).ok_or_else(|| invalid("date", text))?;
            record.timestamp = record.timestamp.with_date(date);
        }
        if let Some(text) = &self.time {
            let time = parse_time(text.trim()).ok_or_else(|| invalid("time", text))?;
            record.timestamp = record.timestamp.with_time(time);
        }
        if self.category.is_some() || self.subcategory.is_some() {
            let primary = self
                .category
                .as_deref()
                .or_else(|| record.categories.primary())
                .unwrap_or_default();
            let secondary = self
                .subcategory
                .as_deref()
                .or_else(|| record.categories.secondary())
                .unwrap_or_default();
            record.categories = Categories::new(primary, secondary);
        }
        if let Some(tags) = &self.tags {
            record.tags = Tags::parse(tags);
        }
        if let Some(author) = &self.author {
            record.author.clone_from(author);
        }
        if let Some(description) = &self.description {
            record.description.clone_from(description);
        }
        Ok(())
    }

    /// The replacement body, if `--body-file` was given.
    pub fn read_body(&self, output: OutputMode) -> anyhow::Result<Option<String>> {
        let Some(path) = &self.body_file else {
            return Ok(None);
        };
        fs::read_to_string(path).map(Some).map_err(|err| {
            fail(
                output,
                CliError::from_code(
                    ErrorCode::DocumentReadFailed,
                    format!("failed to read {}: {err}", path.display()),
                ),
            )
        })
    }

    /// Run `--suggest-tags`, if given, against `body` or the session's body.
    pub fn suggest_tags(
        &self,
        session: &mut Session,
        body: Option<&str>,
        output: OutputMode,
    ) -> anyhow::Result<()> {
        let Some(program) = &self.suggest_tags else {
            return Ok(());
        };
        session
            .enrich_tags(&CommandKeywords::new(program), body)
            .map_err(|err: KeywordError| {
                fail(output, CliError::from_code(err.code(), err.to_string()))
            })
    }
}

fn invalid(field: &str, value: &str) -> CliError {
    CliError::from_code(
        ErrorCode::InvalidFieldValue,
        format!("invalid {field} `{value}`"),
    )
}
