//! Browsing for stashes advertised on the local network.

use anyhow::{Context, Result};
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{DiscoveredStash, SERVICE_TYPE};

/// One-shot browser over `_remotestash._tcp`.
pub struct Browser {
    daemon: ServiceDaemon,
}

impl Browser {
    pub fn new() -> Result<Self> {
        let daemon = ServiceDaemon::new().context("failed to start mDNS daemon")?;
        Ok(Self { daemon })
    }

    /// First stash resolved within `timeout`, optionally the one named `name`.
    pub fn discover(&self, timeout: Duration, name: Option<&str>) -> Result<Option<DiscoveredStash>> {
        let mut found = None;
        self.browse(timeout, |stash| {
            if matches_name(&stash, name) {
                found = Some(stash);
                false
            } else {
                tracing::debug!(name = %stash.name, "skipping stash");
                true
            }
        })?;
        Ok(found)
    }

    /// Every distinct stash resolved within `timeout`.
    pub fn scan(&self, timeout: Duration) -> Result<Vec<DiscoveredStash>> {
        let mut all: Vec<DiscoveredStash> = Vec::new();
        self.browse(timeout, |stash| {
            if !add_unique(&mut all, stash) {
                tracing::debug!("stash already discovered");
            }
            true
        })?;
        Ok(all)
    }

    /// Feed resolved stashes to `on_found` until it returns false or `timeout` elapses.
    fn browse<F>(&self, timeout: Duration, mut on_found: F) -> Result<()>
    where
        F: FnMut(DiscoveredStash) -> bool,
    {
        let receiver = self
            .daemon
            .browse(SERVICE_TYPE)
            .context("failed to browse for stashes")?;
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match receiver.recv_timeout(remaining) {
                Ok(ServiceEvent::ServiceResolved(info)) => {
                    let stash = to_discovered(&info);
                    tracing::info!("found stash {}", stash);
                    if !on_found(stash) {
                        break;
                    }
                }
                Ok(ServiceEvent::ServiceRemoved(_, fullname)) => {
                    tracing::debug!(%fullname, "service removed");
                }
                Ok(event) => tracing::trace!(?event, "mdns event"),
                Err(_) => break,
            }
        }
        if let Err(e) = self.daemon.stop_browse(SERVICE_TYPE) {
            tracing::debug!("stop_browse: {}", e);
        }
        Ok(())
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        if let Err(e) = self.daemon.shutdown() {
            tracing::debug!("mDNS daemon shutdown: {}", e);
        }
    }
}

/// A usable stash, named `name` when a name is given.
fn matches_name(stash: &DiscoveredStash, name: Option<&str>) -> bool {
    name.map_or(true, |n| n == stash.name) && stash.preferred_addr().is_some()
}

/// Append `stash` unless the same server is already listed.
fn add_unique(all: &mut Vec<DiscoveredStash>, stash: DiscoveredStash) -> bool {
    if all.iter().any(|s| s.same_as(&stash)) {
        return false;
    }
    all.push(stash);
    true
}

pub(super) fn to_discovered(info: &ServiceInfo) -> DiscoveredStash {
    let properties: HashMap<String, String> = info
        .get_properties()
        .iter()
        .map(|p| (p.key().to_string(), p.val_str().to_string()))
        .collect();
    DiscoveredStash::new(
        info.get_fullname(),
        info.get_addresses().iter().copied(),
        info.get_port(),
        properties,
    )
}
