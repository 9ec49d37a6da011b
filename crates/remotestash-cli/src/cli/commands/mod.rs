//! CLI command handlers, one file per command, plus the shared context.

mod io;
mod last;
mod list;
mod listen;
mod pull;
mod push;
mod serve;
mod status;

pub use last::run_last;
pub use list::run_list;
pub use listen::run_listen;
pub use pull::run_pull;
pub use push::run_push;
pub use serve::run_serve;
pub use status::run_status;

use anyhow::{Context as _, Result};
use remotestash_core::client::RemoteClient;
use remotestash_core::config::StashConfig;
use remotestash_core::discovery::{net, Browser};
use remotestash_core::stash::Stash;
use std::path::PathBuf;
use std::time::Duration;

use super::GlobalOpts;

pub const NO_STASH_FOUND: &str = "Failed to find a stash on the local network";

/// Config plus command-line overrides, shared by every command.
pub struct Context {
    pub cfg: StashConfig,
    pub opts: GlobalOpts,
}

impl Context {
    pub fn new(cfg: StashConfig, opts: GlobalOpts) -> Self {
        Self { cfg, opts }
    }

    pub fn stash_dir(&self) -> Result<PathBuf> {
        self.cfg.resolve_stash_dir(self.opts.dir.as_deref())
    }

    pub fn open_local(&self) -> Result<Stash> {
        Stash::open(self.stash_dir()?)
    }

    /// `-n`, then config, then "<user> remote stash".
    pub fn service_name(&self) -> String {
        self.opts
            .name
            .clone()
            .or_else(|| self.cfg.service_name.clone())
            .unwrap_or_else(net::default_service_name)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.opts.timeout_ms.unwrap_or(self.cfg.discovery_timeout_ms))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.cfg.request_timeout()
    }

    /// Browse for a stash (the one named `-n` if given) and connect a client to it.
    pub async fn remote(&self) -> Result<RemoteClient> {
        let timeout = self.discovery_timeout();
        let name = self.opts.name.clone();
        let found = tokio::task::spawn_blocking(move || {
            let browser = Browser::new()?;
            browser.discover(timeout, name.as_deref())
        })
        .await??;

        let Some(stash) = found else {
            anyhow::bail!(NO_STASH_FOUND);
        };
        let url = stash
            .base_url()
            .with_context(|| format!("stash {} has no address", stash.name))?;
        tracing::info!("using stash {}", stash);
        RemoteClient::new(&url, self.request_timeout())
    }
}
