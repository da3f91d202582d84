use std::{borrow::Cow, fmt, iter, net::SocketAddr};

use crate::header::{self, SourceHeader};

/// Read-only view of the parts of a request that can carry a client address.
///
/// Implemented for [`http::HeaderMap`], [`http::Request`], and [`RawRequest`]. Framework adapters
/// implement it over their own request types.
pub trait RequestView {
    /// Returns all values of the named header in the order they were received.
    ///
    /// `name` is lowercase; lookup must be case-insensitive. Values that are not visible ASCII are
    /// omitted.
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// Returns the transport peer address as `host:port`, `[host]:port`, or host only.
    fn peer_addr(&self) -> Option<Cow<'_, str>>;
}

/// Formats a socket address as a peer address string.
///
/// IPv6 flow info and scope ids are dropped, as the address would not validate with them.
///
/// # Examples
/// ```
/// use std::net::{SocketAddr, SocketAddrV6};
///
/// let addr = SocketAddrV6::new("fe80::1".parse().unwrap(), 8878, 0, 3);
/// assert_eq!(addr.to_string(), "[fe80::1%3]:8878");
/// assert_eq!(real_ip::peer_addr_string(SocketAddr::V6(addr)), "[fe80::1]:8878");
/// ```
pub fn peer_addr_string(addr: SocketAddr) -> String {
    SocketAddr::new(addr.ip(), addr.port()).to_string()
}

impl<T: RequestView + ?Sized> RequestView for &T {
    fn header_values(&self, name: &str) -> Vec<&str> {
        (**self).header_values(name)
    }

    fn peer_addr(&self) -> Option<Cow<'_, str>> {
        (**self).peer_addr()
    }
}

/// A header map alone has no peer address.
impl RequestView for http::HeaderMap {
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.get_all(name)
            .iter()
            .filter_map(|val| val.to_str().ok())
            .collect()
    }

    fn peer_addr(&self) -> Option<Cow<'_, str>> {
        None
    }
}

/// The peer address is read from a [`SocketAddr`] request extension, if the server inserted one.
impl<B> RequestView for http::Request<B> {
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers().header_values(name)
    }

    fn peer_addr(&self) -> Option<Cow<'_, str>> {
        self.extensions()
            .get::<SocketAddr>()
            .map(|addr| Cow::Owned(peer_addr_string(*addr)))
    }
}

/// Owned request data for callers without an `http` request at hand.
///
/// # Examples
/// ```
/// use real_ip::RawRequest;
///
/// let req = RawRequest::new()
///     .with_header("X-Real-IP", "203.0.113.7")
///     .with_peer_addr("10.0.0.1:51234");
///
/// assert_eq!(real_ip::resolve(&req).unwrap().as_str(), "203.0.113.7");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    headers: Vec<(String, String)>,
    peer_addr: Option<String>,
}

impl RawRequest {
    /// Constructs an empty request with no headers and no peer address.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header line. Repeated names are kept in insertion order.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the transport peer address.
    pub fn with_peer_addr(mut self, addr: impl Into<String>) -> Self {
        self.peer_addr = Some(addr.into());
        self
    }
}

impl RequestView for RawRequest {
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(hdr, _)| hdr.eq_ignore_ascii_case(name))
            .map(|(_, val)| val.as_str())
            .collect()
    }

    fn peer_addr(&self) -> Option<Cow<'_, str>> {
        self.peer_addr.as_deref().map(Cow::Borrowed)
    }
}

/// Where a candidate address was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The `True-Client-IP` header.
    TrueClientIp,

    /// The `X-Real-IP` header.
    XRealIp,

    /// An element of the `X-Forwarded-For` list.
    XForwardedFor,

    /// The transport peer address.
    PeerAddr,
}

impl Source {
    /// Returns the header this source is read from, if any.
    pub const fn header(self) -> Option<SourceHeader> {
        match self {
            Self::TrueClientIp => Some(SourceHeader::TrueClientIp),
            Self::XRealIp => Some(SourceHeader::XRealIp),
            Self::XForwardedFor => Some(SourceHeader::XForwardedFor),
            Self::PeerAddr => None,
        }
    }
}

impl From<SourceHeader> for Source {
    fn from(hdr: SourceHeader) -> Self {
        match hdr {
            SourceHeader::TrueClientIp => Self::TrueClientIp,
            SourceHeader::XRealIp => Self::XRealIp,
            SourceHeader::XForwardedFor => Self::XForwardedFor,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.header() {
            Some(hdr) => fmt::Display::fmt(&hdr, f),
            None => f.write_str("peer address"),
        }
    }
}

/// An unvalidated address string and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    source: Source,
    value: Cow<'a, str>,
}

impl<'a> Candidate<'a> {
    pub(crate) fn new(source: Source, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            source,
            value: value.into(),
        }
    }

    /// Returns where this candidate was read from.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Returns the candidate exactly as it appeared in the request, minus surrounding whitespace.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn into_value(self) -> String {
        self.value.into_owned()
    }
}

/// Returns the candidates of `req` in precedence order.
///
/// 1. the first non-empty `True-Client-IP` value
/// 2. the first non-empty `X-Real-IP` value
/// 3. each non-empty `X-Forwarded-For` element, left to right across all header lines
/// 4. the peer address
///
/// Sources are read lazily so a consumer that stops early never touches later headers.
pub fn candidates<R>(req: &R) -> impl Iterator<Item = Candidate<'_>>
where
    R: RequestView + ?Sized,
{
    let headers = SourceHeader::PRECEDENCE.into_iter().flat_map(move |hdr| {
        let lines = req.header_values(hdr.as_str());

        let values = if hdr.is_list() {
            header::list_items(lines).collect::<Vec<_>>()
        } else {
            // first non-empty line wins; later duplicates are ignored
            lines
                .into_iter()
                .map(str::trim)
                .find(|val| !val.is_empty())
                .into_iter()
                .collect()
        };

        values
            .into_iter()
            .map(move |val| Candidate::new(hdr.into(), val))
    });

    let peer = iter::once_with(move || {
        req.peer_addr()
            .map(|addr| match addr {
                Cow::Borrowed(addr) => Cow::Borrowed(addr.trim()),
                Cow::Owned(addr) => Cow::Owned(addr.trim().to_owned()),
            })
            .filter(|addr| !addr.is_empty())
            .map(|addr| Candidate::new(Source::PeerAddr, addr))
    })
    .flatten();

    headers.chain(peer)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddrV6;

    use http::HeaderValue;

    use super::*;

    fn collect(req: &impl RequestView) -> Vec<(Source, String)> {
        candidates(req)
            .map(|cand| (cand.source(), cand.value().to_owned()))
            .collect()
    }

    #[test]
    fn empty_request() {
        assert!(collect(&RawRequest::new()).is_empty());
    }

    #[test]
    fn precedence_order() {
        let req = RawRequest::new()
            .with_peer_addr("10.0.0.1:1234")
            .with_header("X-Forwarded-For", "1.1.1.1, 2.2.2.2")
            .with_header("X-Real-IP", "3.3.3.3")
            .with_header("True-Client-IP", "4.4.4.4");

        assert_eq!(
            collect(&req),
            [
                (Source::TrueClientIp, "4.4.4.4".to_owned()),
                (Source::XRealIp, "3.3.3.3".to_owned()),
                (Source::XForwardedFor, "1.1.1.1".to_owned()),
                (Source::XForwardedFor, "2.2.2.2".to_owned()),
                (Source::PeerAddr, "10.0.0.1:1234".to_owned()),
            ]
        );
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let req = RawRequest::new().with_header("x-REAL-ip", "3.3.3.3");
        assert_eq!(collect(&req), [(Source::XRealIp, "3.3.3.3".to_owned())]);
    }

    #[test]
    fn single_value_headers_use_first_non_empty() {
        let req = RawRequest::new()
            .with_header("X-Real-IP", "  ")
            .with_header("X-Real-IP", "3.3.3.3")
            .with_header("X-Real-IP", "5.5.5.5");

        assert_eq!(collect(&req), [(Source::XRealIp, "3.3.3.3".to_owned())]);
    }

    #[test]
    fn forwarded_lines_are_joined_in_order() {
        let req = RawRequest::new()
            .with_header("X-Forwarded-For", " 1.1.1.1 ,, 2.2.2.2")
            .with_header("X-Forwarded-For", "")
            .with_header("X-Forwarded-For", "3.3.3.3");

        let values = collect(&req)
            .into_iter()
            .map(|(_, val)| val)
            .collect::<Vec<_>>();

        assert_eq!(values, ["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
    }

    #[test]
    fn http_request_view() {
        let mut req = http::Request::new(());
        req.headers_mut()
            .append("x-forwarded-for", HeaderValue::from_static("1.1.1.1"));
        req.headers_mut()
            .append("x-forwarded-for", HeaderValue::from_static("2.2.2.2"));
        req.extensions_mut()
            .insert("[2001:db8::1]:443".parse::<SocketAddr>().unwrap());

        assert_eq!(
            collect(&req),
            [
                (Source::XForwardedFor, "1.1.1.1".to_owned()),
                (Source::XForwardedFor, "2.2.2.2".to_owned()),
                (Source::PeerAddr, "[2001:db8::1]:443".to_owned()),
            ]
        );

        assert_eq!(collect(req.headers()).len(), 2);
    }

    #[test]
    fn peer_scope_id_is_dropped() {
        let mut req = http::Request::new(());
        req.extensions_mut().insert(SocketAddr::V6(SocketAddrV6::new(
            "fe80::1".parse().unwrap(),
            8878,
            0,
            3,
        )));

        assert_eq!(
            collect(&req),
            [(Source::PeerAddr, "[fe80::1]:8878".to_owned())]
        );
    }

    #[test]
    fn non_ascii_values_are_skipped() {
        let mut headers = http::HeaderMap::new();
        headers.append("x-real-ip", HeaderValue::from_bytes(b"\xff1.2.3.4").unwrap());
        headers.append("x-real-ip", HeaderValue::from_static("5.6.7.8"));

        assert_eq!(collect(&headers), [(Source::XRealIp, "5.6.7.8".to_owned())]);
    }

    #[test]
    fn source_display() {
        assert_eq!(Source::XRealIp.to_string(), "X-Real-IP");
        assert_eq!(Source::PeerAddr.to_string(), "peer address");
    }
}
