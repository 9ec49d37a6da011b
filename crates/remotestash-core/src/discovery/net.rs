//! Local network identity: address, user and host names used when advertising.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Primary LAN address of this machine.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface. Falls back to loopback when there is no route.
pub fn local_ip() -> IpAddr {
    let route_addr = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(("10.255.255.255", 1))?;
        Ok(socket.local_addr()?.ip())
    };
    match route_addr() {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            tracing::debug!("no outbound route, using loopback: {}", e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Login name of the current user.
pub fn user_name() -> String {
    #[cfg(unix)]
    {
        if let Some(name) = passwd_name() {
            return name;
        }
    }
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "anonymous".to_string())
}

#[cfg(unix)]
fn passwd_name() -> Option<String> {
    // SAFETY: getpwuid returns null or a pointer to static storage that stays
    // valid until the next getpw* call; the name is copied out immediately.
    unsafe {
        let pw = libc::getpwuid(libc::getuid());
        if pw.is_null() || (*pw).pw_name.is_null() {
            return None;
        }
        std::ffi::CStr::from_ptr((*pw).pw_name)
            .to_str()
            .ok()
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }
}

/// Service name used when none is configured.
pub fn default_service_name() -> String {
    format!("{} remote stash", user_name())
}

/// mDNS host name of this machine, e.g. `laptop.local.`.
pub fn host_name() -> String {
    let raw = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());
    mdns_host_name(&raw)
}

fn mdns_host_name(raw: &str) -> String {
    let base = raw.trim_end_matches('.');
    let base = base.strip_suffix(".local").unwrap_or(base);
    format!("{}.local.", base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mdns_host_name_normalizes_suffix() {
        assert_eq!(mdns_host_name("laptop"), "laptop.local.");
        assert_eq!(mdns_host_name("laptop.local"), "laptop.local.");
        assert_eq!(mdns_host_name("laptop.local."), "laptop.local.");
    }

    #[test]
    fn default_service_name_mentions_user() {
        let name = default_service_name();
        assert!(name.ends_with(" remote stash"));
        assert!(name.len() > " remote stash".len());
    }

    #[test]
    fn local_ip_is_usable() {
        assert!(!local_ip().is_unspecified());
    }
}
