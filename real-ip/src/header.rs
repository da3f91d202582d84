//! Recognized client address headers.

use std::fmt;

/// A header that may carry the client's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceHeader {
    /// `True-Client-IP`; single value, set by some CDNs.
    TrueClientIp,

    /// `X-Real-IP`; single value, commonly set by nginx.
    XRealIp,

    /// `X-Forwarded-For`; comma-separated list in hop order, client first.
    XForwardedFor,
}

impl SourceHeader {
    /// Headers in the order they are consulted.
    pub const PRECEDENCE: [SourceHeader; 3] = [
        SourceHeader::TrueClientIp,
        SourceHeader::XRealIp,
        SourceHeader::XForwardedFor,
    ];

    /// Returns the lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrueClientIp => "true-client-ip",
            Self::XRealIp => "x-real-ip",
            Self::XForwardedFor => "x-forwarded-for",
        }
    }

    /// Returns true if the header carries a list of addresses rather than a single one.
    pub const fn is_list(self) -> bool {
        matches!(self, Self::XForwardedFor)
    }
}

impl fmt::Display for SourceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TrueClientIp => "True-Client-IP",
            Self::XRealIp => "X-Real-IP",
            Self::XForwardedFor => "X-Forwarded-For",
        })
    }
}

/// Splits list header lines into their elements.
///
/// Lines are read as if they were joined with commas. Elements are trimmed and empty ones are
/// dropped; order is preserved.
///
/// # Examples
/// ```
/// use real_ip::header::list_items;
///
/// let items = list_items(["10.0.0.1, 151.255.30.50", "", " 27.10.10.11 ,"]).collect::<Vec<_>>();
/// assert_eq!(items, ["10.0.0.1", "151.255.30.50", "27.10.10.11"]);
/// ```
pub fn list_items<'a, I>(lines: I) -> impl Iterator<Item = &'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
}
