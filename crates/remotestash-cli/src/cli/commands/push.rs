//! `remotestash push` – add FILE or stdin to the stash.

use anyhow::Result;
use std::path::Path;

use super::io::read_item;
use super::Context;

pub async fn run_push(ctx: &Context, file: Option<&Path>) -> Result<()> {
    let item = read_item(ctx.opts.content_type.as_deref(), file)?;

    if ctx.opts.local {
        let mut stash = ctx.open_local()?;
        stash.push(item)?;
        return Ok(());
    }

    let client = ctx.remote().await?;
    let reply = tokio::task::spawn_blocking(move || client.push(&item)).await??;
    println!("{}", reply);
    Ok(())
}
