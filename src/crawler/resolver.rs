//! Best-effort host address resolution

use crate::state::ResolvedAddress;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;

/// Maps a host name to an IP address
///
/// Implementations block; the crawler calls them on the blocking pool.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// Resolver backed by the operating system's name lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        // IPv6 literals come out of Url::host_str bracketed
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Some(ip);
        }

        (host, 0)
            .to_socket_addrs()
            .ok()?
            .map(|addr| addr.ip())
            .find(IpAddr::is_ipv4)
    }
}

/// Resolves `host` off the async runtime, never failing
pub(crate) async fn resolve_address(
    resolver: Arc<dyn AddressResolver>,
    host: String,
) -> ResolvedAddress {
    match tokio::task::spawn_blocking(move || resolver.resolve(&host)).await {
        Ok(ip) => ResolvedAddress::from(ip),
        Err(e) => {
            tracing::debug!("Address lookup task failed: {}", e);
            ResolvedAddress::NotFound
        }
    }
}
