//! Address shape classification and host extraction.
//!
//! Candidates arrive as bare addresses or with a trailing port. Only the host portion is validated;
//! the candidate itself is never rewritten.

/// The syntactic shape of an address candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrShape {
    /// Dotted IPv4 with no colon anywhere, e.g. `192.0.2.1`.
    BareV4,

    /// Dotted IPv4 followed by a port, e.g. `192.0.2.1:8080`.
    V4WithPort,

    /// Unbracketed IPv6, e.g. `2001:db8::1` or `::ffff:192.0.2.1`. Never has a port.
    BareV6,

    /// Bracketed IPv6, usually with a port, e.g. `[2001:db8::1]:8080`.
    BracketedV6,

    /// Neither a `.` nor a `:` is present. Includes the empty string.
    Opaque,
}

impl AddrShape {
    /// Classifies a candidate by its first separator.
    ///
    /// A `.` before any `:` means IPv4, with a port if a `:` appears anywhere later. A `:` first
    /// means IPv6, which is only split when the candidate starts with `[`.
    pub fn classify(candidate: &str) -> Self {
        let Some(idx) = candidate.find(['.', ':']) else {
            return Self::Opaque;
        };

        if candidate.as_bytes()[idx] == b'.' {
            if candidate[idx..].contains(':') {
                Self::V4WithPort
            } else {
                Self::BareV4
            }
        } else if candidate.starts_with('[') {
            Self::BracketedV6
        } else {
            Self::BareV6
        }
    }

    /// Returns true if the shape carries a port that [`host`] strips.
    pub const fn has_port(self) -> bool {
        matches!(self, Self::V4WithPort | Self::BracketedV6)
    }
}

/// Returns the host portion of `candidate` suitable for address validation.
///
/// Ports and IPv6 brackets are removed; bare addresses are returned unchanged. Malformed input
/// (unbalanced brackets, junk after `]`) is also returned unchanged so that it fails validation.
///
/// # Examples
/// ```
/// use real_ip::shape::host;
///
/// assert_eq!(host("10.255.30.50:8878"), "10.255.30.50");
/// assert_eq!(host("[2001:db8::8888]:8878"), "2001:db8::8888");
/// assert_eq!(host("2001:db8::8888"), "2001:db8::8888");
/// ```
pub fn host(candidate: &str) -> &str {
    if !AddrShape::classify(candidate).has_port() {
        return candidate;
    }

    split_host_port(candidate).map_or(candidate, |(host, _port)| host)
}

/// Returns the trailing port of `candidate`, if it has a numeric one.
pub fn port(candidate: &str) -> Option<u16> {
    if !AddrShape::classify(candidate).has_port() {
        return None;
    }

    split_host_port(candidate)?.1.parse().ok()
}

/// Splits `host:port` or `[host]:port`, rejecting stray brackets and colons in the host.
///
/// A bracketed literal with no port at all (`[::1]`) is accepted with an empty port.
fn split_host_port(candidate: &str) -> Option<(&str, &str)> {
    let (host, port) = match candidate.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest.split_once(']')?;

            if after.is_empty() {
                return Some((host, ""));
            }

            (host, after.strip_prefix(':')?)
        }

        None => {
            let (host, port) = candidate.rsplit_once(':')?;

            if host.contains(':') {
                return None;
            }

            (host, port)
        }
    };

    if host.contains(['[', ']']) || port.contains(['[', ']']) {
        return None;
    }

    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_shapes() {
        assert_eq!(AddrShape::classify("10.255.30.50"), AddrShape::BareV4);
        assert_eq!(AddrShape::classify("10.255.30.50:8878"), AddrShape::V4WithPort);
        assert_eq!(AddrShape::classify("2001:db8::1"), AddrShape::BareV6);
        assert_eq!(AddrShape::classify("::1"), AddrShape::BareV6);
        assert_eq!(AddrShape::classify("[2001:db8::1]:8878"), AddrShape::BracketedV6);
        assert_eq!(AddrShape::classify("[::1]"), AddrShape::BracketedV6);
        assert_eq!(AddrShape::classify("text"), AddrShape::Opaque);
        assert_eq!(AddrShape::classify(""), AddrShape::Opaque);
    }

    #[test]
    fn embedded_ipv4_in_ipv6_is_not_split() {
        assert_eq!(AddrShape::classify("::ffff:192.0.2.1"), AddrShape::BareV6);
        assert_eq!(host("::ffff:192.0.2.1"), "::ffff:192.0.2.1");
        assert_eq!(host("64:ff9b::192.0.2.1"), "64:ff9b::192.0.2.1");
    }

    #[test]
    fn bare_ipv6_without_dots_is_untouched() {
        let addr = "2001:db8:3333:4444:5555:6666:7777:8888";
        assert_eq!(host(addr), addr);
        assert_eq!(port(addr), None);
    }

    #[test]
    fn strips_ports() {
        assert_eq!(host("10.255.30.50:8878"), "10.255.30.50");
        assert_eq!(port("10.255.30.50:8878"), Some(8878));

        assert_eq!(
            host("[2001:db8:3333:4444:5555:6666:7777:8888]:8878"),
            "2001:db8:3333:4444:5555:6666:7777:8888"
        );
        assert_eq!(
            port("[2001:db8:3333:4444:5555:6666:7777:8888]:8878"),
            Some(8878)
        );
    }

    #[test]
    fn bracketed_without_port() {
        assert_eq!(host("[::1]"), "::1");
        assert_eq!(port("[::1]"), None);
    }

    #[test]
    fn empty_port() {
        assert_eq!(host("10.0.0.1:"), "10.0.0.1");
        assert_eq!(port("10.0.0.1:"), None);
        assert_eq!(port("10.0.0.1:http"), None);
    }

    #[test]
    fn malformed_is_returned_unchanged() {
        assert_eq!(host(""), "");
        assert_eq!(host("[::1"), "[::1");
        assert_eq!(host("[::1]8080"), "[::1]8080");
        assert_eq!(host("[::1]]:8080"), "[::1]]:8080");
        assert_eq!(host("1.2.3.4:5:6"), "1.2.3.4:5:6");
        assert_eq!(port("[::1"), None);
    }
}
