//! Address validation and private range classification.

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use once_cell::sync::Lazy;

use crate::shape;

/// Address blocks that never identify a publicly routable client.
static RESERVED_RANGES: Lazy<Vec<IpNetwork>> = Lazy::new(|| {
    [
        "10.0.0.0/8",         // RFC 1918
        "172.16.0.0/12",      // RFC 1918
        "192.168.0.0/16",     // RFC 1918
        "127.0.0.0/8",        // loopback
        "169.254.0.0/16",     // link-local
        "0.0.0.0/8",          // "this network"
        "224.0.0.0/4",        // multicast
        "255.255.255.255/32", // broadcast
        "::/128",             // unspecified
        "::1/128",            // loopback
        "fc00::/7",           // unique local
        "fe80::/10",          // link-local
        "ff00::/8",           // multicast
    ]
    .iter()
    .filter_map(|cidr| cidr.parse().ok())
    .collect()
});

/// Parses a normalized host as an IPv4 or IPv6 literal.
///
/// Invalid syntax is a normal `None` result. Zone identifiers (`fe80::1%eth0`) are not accepted.
pub fn parse_host(host: &str) -> Option<IpAddr> {
    host.parse().ok()
}

/// Normalizes `candidate` and parses its host portion.
///
/// # Examples
/// ```
/// use real_ip::validate::validate;
///
/// assert!(validate("10.255.30.50:8878").is_some());
/// assert!(validate("[2001:db8::1]:443").is_some());
/// assert!(validate("10.255.30.500").is_none());
/// assert!(validate("text").is_none());
/// ```
pub fn validate(candidate: &str) -> Option<IpAddr> {
    parse_host(shape::host(candidate))
}

/// Returns true if `ip` falls within a private, loopback, link-local, unspecified, broadcast, or
/// multicast range.
///
/// IPv4-mapped IPv6 addresses are classified by the IPv4 address they embed.
pub fn is_private(ip: IpAddr) -> bool {
    let ip = canonical(ip);
    RESERVED_RANGES.iter().any(|net| net.contains(ip))
}

/// Unwraps IPv4-mapped IPv6 addresses so they match IPv4 ranges.
pub(crate) fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}
