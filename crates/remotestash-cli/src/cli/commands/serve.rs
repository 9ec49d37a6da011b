//! `remotestash serve` – serve the local stash and advertise it until Ctrl-C.

use anyhow::{Context as _, Result};
use remotestash_core::discovery::{net, Advertiser};
use remotestash_core::server::{load_server_config, RequestHandler, Server, ServerOptions};

use super::Context;

pub async fn run_serve(ctx: &Context) -> Result<()> {
    let stash = ctx.open_local()?;
    let stash_dir = stash.location().to_path_buf();
    let name = ctx.service_name();
    let address = ctx.cfg.address.unwrap_or_else(net::local_ip);
    let port = ctx.opts.port.or(ctx.cfg.port).unwrap_or(0);

    let mut options = ServerOptions::from_config(&ctx.cfg, address, port);
    match ctx.cfg.tls_paths(&stash_dir) {
        Some((key, cert)) => options.tls = Some(load_server_config(&key, &cert)?),
        None => tracing::warn!(
            dir = %stash_dir.display(),
            "no TLS key and certificate found, serving plain HTTP"
        ),
    }
    let tls = options.tls.is_some();

    let server = Server::bind(options, RequestHandler::new(&stash_dir))?;
    let port = server.local_addr()?.port();
    let handle = server.handle()?;
    let mut advertiser = Advertiser::start_with_tls(&name, address, port, tls)?;

    println!(
        "Starting server as {} on {}:{}, use <Ctrl-C> to stop",
        name, address, port
    );

    let mut serving = tokio::task::spawn_blocking(move || server.serve());
    let interrupted = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for Ctrl-C")?;
            true
        }
        res = &mut serving => {
            res??;
            false
        }
    };

    advertiser.stop()?;
    if interrupted {
        tracing::info!("interrupted, stopping server");
        handle.shutdown();
        serving.await??;
    }
    Ok(())
}
