//! `postsmith new`: create a post under the project's posts directory.

use clap::Args;
use postsmith_core::record::Timestamp;
use postsmith_core::session::Session;
use postsmith_core::store::FsStore;

use super::fields::FieldArgs;
use super::{Context, WriteReport};
use crate::output::fail;

#[derive(Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: FieldArgs,
}

pub fn run_new(args: &NewArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::new(Timestamp::now());
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
    WriteReport::new(&generated, Vec::new(), &roster, &session.record().author).render(ctx.output)
}
