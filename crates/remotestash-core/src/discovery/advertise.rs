//! Publishing this stash on the local network.

use anyhow::{Context, Result};
use mdns_sd::{ServiceDaemon, ServiceInfo};
use std::net::IpAddr;
use std::time::Duration;
use uuid::Uuid;

use super::{net, DEVICE_TYPE, SERVICE_TYPE};

/// A registered `_remotestash._tcp` service. Unregistered on `stop` or drop.
pub struct Advertiser {
    daemon: ServiceDaemon,
    fullname: String,
    uuid: Uuid,
    stopped: bool,
}

impl Advertiser {
    /// Register `name` for `ip:port` with the mDNS responder, served over HTTPS.
    pub fn start(name: &str, ip: IpAddr, port: u16) -> Result<Self> {
        Self::start_with_tls(name, ip, port, true)
    }

    /// Like [`Advertiser::start`]; a server without TLS adds `scheme=http`.
    pub fn start_with_tls(name: &str, ip: IpAddr, port: u16, tls: bool) -> Result<Self> {
        let daemon = ServiceDaemon::new().context("failed to start mDNS daemon")?;
        let uuid = Uuid::new_v4();
        let info = service_info(name, &net::host_name(), ip, port, tls, uuid)?;
        let fullname = info.get_fullname().to_string();
        daemon
            .register(info)
            .with_context(|| format!("failed to register {}", fullname))?;
        tracing::info!(%fullname, %ip, port, %uuid, tls, "advertising stash");
        Ok(Self {
            daemon,
            fullname,
            uuid,
            stopped: false,
        })
    }

    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Unregister the service and shut the responder down.
    pub fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        let status = self
            .daemon
            .unregister(&self.fullname)
            .with_context(|| format!("failed to unregister {}", self.fullname))?;
        // Wait briefly so the goodbye packet goes out before shutdown.
        if let Err(e) = status.recv_timeout(Duration::from_secs(1)) {
            tracing::debug!("unregister status not received: {}", e);
        }
        if let Err(e) = self.daemon.shutdown() {
            tracing::debug!("mDNS daemon shutdown: {}", e);
        }
        tracing::info!(fullname = %self.fullname, "advertisement stopped");
        Ok(())
    }
}

impl Drop for Advertiser {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("cleaning advertisement: {:#}", e);
        }
    }
}

/// The DNS-SD record for a stash: TXT `type`, `uuid`, `temporary=no`, plus
/// `scheme=http` when served without TLS.
fn service_info(
    name: &str,
    host: &str,
    ip: IpAddr,
    port: u16,
    tls: bool,
    uuid: Uuid,
) -> Result<ServiceInfo> {
    let uuid_str = uuid.to_string();
    let mut properties = vec![
        ("type", DEVICE_TYPE),
        ("uuid", uuid_str.as_str()),
        ("temporary", "no"),
    ];
    if !tls {
        properties.push(("scheme", "http"));
    }
    let ip_str = ip.to_string();
    ServiceInfo::new(SERVICE_TYPE, name, host, ip_str.as_str(), port, &properties[..])
        .context("invalid service info")
}
