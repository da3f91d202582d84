use std::{fmt, net::IpAddr};

use ipnetwork::IpNetwork;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::{
    shape,
    source::{Candidate, RequestView, Source, candidates},
    validate::{self, validate},
};

/// What to do when `True-Client-IP` or `X-Real-IP` is present but does not hold a valid address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidHeader {
    /// Stop and report that no address was found.
    ///
    /// A proxy that sets the header is expected to set it correctly; anything else is treated as
    /// tampering.
    #[default]
    Reject,

    /// Ignore the header and continue with the next source.
    FallThrough,
}

/// Client address resolver configuration.
///
/// Sources are always consulted in the same order: `True-Client-IP`, `X-Real-IP`,
/// `X-Forwarded-For`, then the peer address. The first one that yields a usable address wins and
/// is returned verbatim.
///
/// Can be deserialized from application config; omitted fields take their default values.
///
/// # Examples
/// ```
/// use real_ip::{InvalidHeader, RawRequest, Resolver};
///
/// let resolver = Resolver::default()
///     .on_invalid_header(InvalidHeader::FallThrough)
///     .private_range("100.64.0.0/10".parse().unwrap());
///
/// let req = RawRequest::new()
///     .with_header("X-Real-IP", "unknown")
///     .with_header("X-Forwarded-For", "100.64.3.2, 198.51.100.4");
///
/// assert_eq!(resolver.resolve(&req).unwrap().as_str(), "198.51.100.4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Resolver {
    on_invalid_header: InvalidHeader,
    skip_private_forwarded: bool,
    peer_fallback: bool,
    private_ranges: Vec<IpNetwork>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            on_invalid_header: InvalidHeader::Reject,
            skip_private_forwarded: true,
            peer_fallback: true,
            private_ranges: Vec::new(),
        }
    }
}

impl Resolver {
    /// Sets handling of invalid single-value headers.
    ///
    /// Defaults to [`InvalidHeader::Reject`].
    pub fn on_invalid_header(mut self, behavior: InvalidHeader) -> Self {
        self.on_invalid_header = behavior;
        self
    }

    /// Sets whether private and reserved `X-Forwarded-For` entries are skipped.
    ///
    /// Enabled by default so that internal proxy hops are passed over in favor of the first
    /// publicly routable address.
    pub fn skip_private_forwarded(mut self, skip: bool) -> Self {
        self.skip_private_forwarded = skip;
        self
    }

    /// Sets whether a valid peer address is used when no header yields an address.
    ///
    /// Enabled by default.
    pub fn peer_fallback(mut self, fallback: bool) -> Self {
        self.peer_fallback = fallback;
        self
    }

    /// Adds a range that is treated as internal when scanning `X-Forwarded-For`, in addition to the
    /// built-in reserved ranges.
    pub fn private_range(mut self, range: IpNetwork) -> Self {
        self.private_ranges.push(range);
        self
    }

    /// Returns true if `ip` is skipped by the `X-Forwarded-For` privacy filter.
    pub fn is_private(&self, ip: IpAddr) -> bool {
        validate::is_private(ip) || {
            let ip = validate::canonical(ip);
            self.private_ranges.iter().any(|net| net.contains(ip))
        }
    }

    /// Resolves the client address of `req`.
    ///
    /// Returns `None` when no source holds a usable address. That is an expected outcome, not a
    /// fault; callers typically fall back to the raw peer address or log it.
    pub fn resolve<R>(&self, req: &R) -> Option<RealIp>
    where
        R: RequestView + ?Sized,
    {
        for candidate in candidates(req) {
            let source = candidate.source();
            let ip = validate(candidate.value());

            match (source, ip) {
                (Source::TrueClientIp | Source::XRealIp, Some(ip)) => {
                    return Some(RealIp::new(candidate, ip));
                }

                (Source::TrueClientIp | Source::XRealIp, None) => match self.on_invalid_header {
                    InvalidHeader::Reject => {
                        debug!(
                            %source,
                            value = candidate.value(),
                            "rejecting invalid client address header"
                        );
                        return None;
                    }
                    InvalidHeader::FallThrough => {
                        trace!(
                            %source,
                            value = candidate.value(),
                            "skipping invalid client address header"
                        );
                    }
                },

                (Source::XForwardedFor, Some(ip)) => {
                    if self.skip_private_forwarded && self.is_private(ip) {
                        trace!(value = candidate.value(), "skipping private forwarded address");
                        continue;
                    }

                    return Some(RealIp::new(candidate, ip));
                }

                (Source::XForwardedFor, None) => {
                    trace!(value = candidate.value(), "skipping invalid forwarded address");
                }

                (Source::PeerAddr, _) if !self.peer_fallback => break,

                (Source::PeerAddr, Some(ip)) => return Some(RealIp::new(candidate, ip)),

                (Source::PeerAddr, None) => {
                    trace!(value = candidate.value(), "peer address is not a valid address");
                }
            }
        }

        debug!("no usable client address found");
        None
    }
}

/// Resolves the client address of `req` using the default [`Resolver`].
///
/// # Examples
/// ```
/// use real_ip::RawRequest;
///
/// let req = RawRequest::new().with_header("X-Real-IP", "10.255.30.50:8878");
/// let ip = real_ip::resolve(&req).unwrap();
///
/// assert_eq!(ip.as_str(), "10.255.30.50:8878");
/// assert_eq!(ip.port(), Some(8878));
///
/// let req = RawRequest::new().with_header("X-Real-IP", "10.255.30.500");
/// assert!(real_ip::resolve(&req).is_none());
/// ```
pub fn resolve<R>(req: &R) -> Option<RealIp>
where
    R: RequestView + ?Sized,
{
    Resolver::default().resolve(req)
}

/// A resolved client address.
///
/// The string form is copied verbatim from the winning source, including any port or IPv6
/// brackets. It is guaranteed to hold a valid address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RealIp {
    value: String,
    source: Source,
    ip: IpAddr,
}

impl AsRef<str> for RealIp {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for RealIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl RealIp {
    fn new(candidate: Candidate<'_>, ip: IpAddr) -> Self {
        Self {
            source: candidate.source(),
            value: candidate.into_value(),
            ip,
        }
    }

    /// Returns the address exactly as it appeared in the request.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns where the address was read from.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Returns the parsed host portion of the address.
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Returns the port, if the source included one.
    pub fn port(&self) -> Option<u16> {
        shape::port(&self.value)
    }

    /// Unwraps into the verbatim address string.
    pub fn into_inner(self) -> String {
        self.value
    }
}
