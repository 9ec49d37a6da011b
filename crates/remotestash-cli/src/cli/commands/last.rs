//! `remotestash last` – show the last item, leaving it on the stash.

use anyhow::Result;

use super::io::write_item;
use super::Context;

pub async fn run_last(ctx: &Context) -> Result<()> {
    let item = if ctx.opts.local {
        ctx.open_local()?.last()?
    } else {
        let client = ctx.remote().await?;
        tokio::task::spawn_blocking(move || client.last()).await??
    };

    if let Some(item) = item {
        write_item(&item, ctx.opts.output.as_deref())?;
    }
    Ok(())
}
