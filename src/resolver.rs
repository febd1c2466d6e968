use crate::error::{ProbeError, Result};
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

/// A probe target as the user named it, plus the address we send to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub name: String,
    pub addr: Ipv4Addr,
}

/// Turns a dotted quad or a hostname into an IPv4 destination.
pub fn resolve(name: &str) -> Result<Destination> {
    let name = name.trim();
    if let Ok(addr) = name.parse::<Ipv4Addr>() {
        return Ok(Destination { name: name.to_string(), addr });
    }

    let addresses = dns_lookup::lookup_host(name).map_err(|e| {
        debug!("lookup of {} failed: {}", name, e);
        ProbeError::UnresolvedHost(name.to_string())
    })?;

    addresses
        .into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
        .map(|addr| Destination { name: name.to_string(), addr })
        .ok_or_else(|| ProbeError::UnresolvedHost(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_address() {
        let dest = resolve("192.168.1.1").unwrap();
        assert_eq!(dest.addr, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(dest.name, "192.168.1.1");
    }

    /// Needs `localhost` in the hosts file or the system resolver.
    #[test]
    fn localhost() {
        let dest = resolve("localhost").unwrap();
        assert!(dest.addr.is_loopback());
        assert_eq!(dest.name, "localhost");
    }

    #[test]
    fn ipv6_literal_is_unresolved() {
        assert!(matches!(resolve("::1"), Err(ProbeError::UnresolvedHost(_))));
    }

    /// Needs a system resolver that answers NXDOMAIN for `.invalid`.
    #[test]
    fn unknown_host() {
        match resolve("no-such-host.invalid") {
            Err(ProbeError::UnresolvedHost(name)) => assert_eq!(name, "no-such-host.invalid"),
            other => panic!("expected UnresolvedHost, got {other:?}"),
        }
    }
}
