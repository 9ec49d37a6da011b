//! DNS-SD over mDNS: advertising a stash and finding stashes on the LAN.

mod advertise;
mod browse;
pub mod net;

pub use advertise::Advertiser;
pub use browse::Browser;

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

/// Service type every stash registers under.
pub const SERVICE_TYPE: &str = "_remotestash._tcp.local.";

/// Value of the `type` TXT property.
pub const DEVICE_TYPE: &str = "remotestash_device";

/// A stash resolved on the local network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredStash {
    /// Instance name, e.g. "alice remote stash".
    pub name: String,
    /// Full DNS-SD name including the service type.
    pub fullname: String,
    pub addresses: Vec<IpAddr>,
    pub port: u16,
    pub uuid: Option<String>,
    /// Stashes running on phones advertise `temporary=yes`.
    pub temporary: bool,
    pub properties: HashMap<String, String>,
}

impl DiscoveredStash {
    pub fn new(
        fullname: &str,
        addresses: impl IntoIterator<Item = IpAddr>,
        port: u16,
        properties: HashMap<String, String>,
    ) -> Self {
        let mut addresses: Vec<IpAddr> = addresses.into_iter().collect();
        addresses.sort();
        let uuid = properties.get("uuid").cloned();
        // Desktop servers send "no" or nothing; only "y..." counts.
        let temporary = properties
            .get("temporary")
            .is_some_and(|v| v.starts_with('y'));
        Self {
            name: instance_name(fullname).to_string(),
            fullname: fullname.to_string(),
            addresses,
            port,
            uuid,
            temporary,
            properties,
        }
    }

    /// Address to connect to: the first IPv4 address, else the first address.
    pub fn preferred_addr(&self) -> Option<SocketAddr> {
        self.addresses
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| self.addresses.first())
            .map(|ip| SocketAddr::new(*ip, self.port))
    }

    /// `https://<addr>/` for the preferred address (IPv6 bracketed), or
    /// `http://` when the stash advertises `scheme=http`.
    pub fn base_url(&self) -> Option<String> {
        let scheme = match self.properties.get("scheme").map(String::as_str) {
            Some("http") => "http",
            _ => "https",
        };
        self.preferred_addr()
            .map(|addr| format!("{}://{}/", scheme, addr))
    }

    /// Two records describe the same server when their UUIDs match.
    pub fn same_as(&self, other: &DiscoveredStash) -> bool {
        match (&self.uuid, &other.uuid) {
            (Some(a), Some(b)) => a == b,
            _ => self.fullname == other.fullname,
        }
    }
}

impl std::fmt::Display for DiscoveredStash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.preferred_addr() {
            Some(addr) => write!(f, "{} at {}", self.name, addr),
            None => write!(f, "{} (no address)", self.name),
        }
    }
}

/// Strip the service type from a full DNS-SD name.
pub fn instance_name(fullname: &str) -> &str {
    fullname
        .strip_suffix(SERVICE_TYPE)
        .map(|s| s.trim_end_matches('.'))
        .unwrap_or(fullname)
}
