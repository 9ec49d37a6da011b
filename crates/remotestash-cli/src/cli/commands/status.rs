//! `remotestash status` – item count and last item, as JSON.

use anyhow::Result;

use super::Context;

pub async fn run_status(ctx: &Context) -> Result<()> {
    let status = if ctx.opts.local {
        ctx.open_local()?.status()?
    } else {
        let client = ctx.remote().await?;
        tokio::task::spawn_blocking(move || client.status()).await??
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
