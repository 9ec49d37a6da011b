//! `remotestash pull` – take the last item off the stash.

use anyhow::Result;

use super::io::write_item;
use super::Context;

pub async fn run_pull(ctx: &Context) -> Result<()> {
    let item = if ctx.opts.local {
        ctx.open_local()?.pull()?
    } else {
        let client = ctx.remote().await?;
        tokio::task::spawn_blocking(move || client.pull()).await??
    };

    match item {
        Some(item) => write_item(&item, ctx.opts.output.as_deref()),
        None => {
            tracing::info!("stash is empty, nothing pulled");
            Ok(())
        }
    }
}
