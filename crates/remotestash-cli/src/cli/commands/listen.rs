//! `remotestash listen` – print every stash advertised on the network.

use anyhow::Result;
use remotestash_core::discovery::Browser;

use super::{Context, NO_STASH_FOUND};

pub async fn run_listen(ctx: &Context) -> Result<()> {
    let timeout = ctx.discovery_timeout();
    let found = tokio::task::spawn_blocking(move || Browser::new()?.scan(timeout)).await??;
    if found.is_empty() {
        anyhow::bail!(NO_STASH_FOUND);
    }
    for stash in found {
        let url = stash.base_url().unwrap_or_else(|| "-".to_string());
        let kind = if stash.temporary { " (temporary)" } else { "" };
        println!("{}\t{}{}", stash.name, url, kind);
    }
    Ok(())
}
