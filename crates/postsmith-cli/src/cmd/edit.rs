//! `postsmith edit`: update an existing post in place.

use std::path::PathBuf;

use clap::Args;
use postsmith_core::decode::DecodeWarning;
use postsmith_core::record::Timestamp;
use postsmith_core::session::Session;
use postsmith_core::store::FsStore;

use super::fields::FieldArgs;
use super::{Context, WriteReport};
use crate::output::fail;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Post file to update.
    pub file: PathBuf,

    #[command(flatten)]
    pub fields: FieldArgs,
}

pub fn run_edit(args: &EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let now = Timestamp::now();
    let mut session = Session::new(now);
    let warnings = session
        .load(&FsStore, &args.file, now)
        .map_err(|err| ctx.session_error(&err))?;

    args.fields
        .apply(session.record_mut())
        .map_err(|err| fail(ctx.output, err))?;
    session
        .validate(ctx.project_root())
        .map_err(|err| ctx.session_error(&err))?;

    let body = args.fields.read_body(ctx.output)?;
    args.fields
        .suggest_tags(&mut session, body.as_deref(), ctx.output)?;

    let generated = session
        .generate(&ctx.layout(), &FsStore, ctx.project_root(), body.as_deref())
        .map_err(|err| ctx.session_error(&err))?;

    let roster = ctx.roster();
    let messages = warnings.iter().map(DecodeWarning::to_string).collect();
    WriteReport::new(&generated, messages, &roster, &session.record().author).render(ctx.output)
}
