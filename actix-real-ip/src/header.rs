//! Typed client address headers.

use std::fmt;

use actix_web::{
    HttpMessage,
    error::ParseError,
    http::header::{Header, HeaderName, HeaderValue, InvalidHeaderValue, TryIntoHeaderValue},
};
use itertools::Itertools as _;

/// The `True-Client-IP` header name.
#[allow(clippy::declare_interior_mutable_const)]
pub const TRUE_CLIENT_IP: HeaderName = HeaderName::from_static("true-client-ip");

/// The `X-Real-IP` header name.
#[allow(clippy::declare_interior_mutable_const)]
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// The `X-Forwarded-For` header name.
#[allow(clippy::declare_interior_mutable_const)]
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

macro_rules! single_value_header {
    ($(#[$meta:meta])* $ty:ident, $name:ident) => {
        $(#[$meta])*
        ///
        /// Holds the raw, unvalidated value; no trust guarantee is implied.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $ty(pub String);

        impl_more::forward_display!($ty);

        impl TryIntoHeaderValue for $ty {
            type Error = InvalidHeaderValue;

            fn try_into_value(self) -> Result<HeaderValue, Self::Error> {
                HeaderValue::try_from(self.0)
            }
        }

        impl Header for $ty {
            fn name() -> HeaderName {
                $name
            }

            fn parse<M: HttpMessage>(msg: &M) -> Result<Self, ParseError> {
                // first non-empty line wins; later duplicates are ignored
                msg.headers()
                    .get_all(Self::name())
                    .filter_map(|hdr| hdr.to_str().ok())
                    .map(str::trim)
                    .find(|val| !val.is_empty())
                    .map(|val| Self(val.to_owned()))
                    .ok_or(ParseError::Header)
            }
        }
    };
}

single_value_header!(
    /// The `True-Client-IP` header, set by some CDNs to the connecting client's address.
    TrueClientIp,
    TRUE_CLIENT_IP
);

single_value_header!(
    /// The `X-Real-IP` header, commonly set by nginx to the connecting client's address.
    XRealIp,
    X_REAL_IP
);

/// The `X-Forwarded-For` header.
///
/// An ordered list of addresses in hop order: the client first, then each proxy the request
/// passed through. Multiple header lines are read as if they were one comma-separated line.
///
/// Entries are kept exactly as received (minus whitespace) and are not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XForwardedFor(pub Vec<String>);

impl XForwardedFor {
    /// Returns the first entry, which is typically the client.
    pub fn client(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Returns iterator over the chain, client first.
    pub fn chain(&self) -> impl Iterator<Item = &'_ str> {
        self.0.iter().map(String::as_str)
    }

    /// Adds an address to the end of the chain.
    ///
    /// Useful when re-forwarding a request on behalf of the current peer.
    pub fn push(&mut self, addr: impl Into<String>) {
        self.0.push(addr.into());
    }
}

impl fmt::Display for XForwardedFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(", "))
    }
}

impl TryIntoHeaderValue for XForwardedFor {
    type Error = InvalidHeaderValue;

    fn try_into_value(self) -> Result<HeaderValue, Self::Error> {
        HeaderValue::try_from(self.0.into_iter().join(", "))
    }
}

impl Header for XForwardedFor {
    fn name() -> HeaderName {
        X_FORWARDED_FOR
    }

    fn parse<M: HttpMessage>(msg: &M) -> Result<Self, ParseError> {
        let lines = msg
            .headers()
            .get_all(Self::name())
            .filter_map(|hdr| hdr.to_str().ok());

        let chain = real_ip::header::list_items(lines)
            .map(str::to_owned)
            .collect::<Vec<_>>();

        if chain.is_empty() {
            return Err(ParseError::Header);
        }

        Ok(Self(chain))
    }
}

#[cfg(test)]
pub(crate) use self::header_test_helpers::{assert_parse_eq, assert_parse_fail};


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header() {
        assert_parse_fail::<XRealIp, _, _>([""; 0]);
        assert_parse_fail::<XRealIp, _, _>([""]);
        assert_parse_fail::<TrueClientIp, _, _>(["   "]);
        assert_parse_fail::<XForwardedFor, _, _>([""; 0]);
        assert_parse_fail::<XForwardedFor, _, _>([" , ,"]);
    }

    #[test]
    fn single_value_is_raw() {
        assert_parse_eq::<XRealIp, _, _>(
            ["10.255.30.50:8878"],
            XRealIp("10.255.30.50:8878".to_owned()),
        );

        // no validation happens at this layer
        assert_parse_eq::<TrueClientIp, _, _>(["unknown"], TrueClientIp("unknown".to_owned()));
    }

    #[test]
    fn single_value_first_non_empty_line() {
        assert_parse_eq::<XRealIp, _, _>(
            ["", " 1.2.3.4 ", "5.6.7.8"],
            XRealIp("1.2.3.4".to_owned()),
        );
    }

    #[test]
    fn forwarded_for_chain() {
        let fwd = XForwardedFor(vec![
            "10.255.30.50".to_owned(),
            "151.255.30.50".to_owned(),
            "27.10.10.11".to_owned(),
        ]);

        assert_parse_eq::<XForwardedFor, _, _>(
            ["10.255.30.50, 151.255.30.50", "27.10.10.11"],
            fwd.clone(),
        );
        assert_parse_eq::<XForwardedFor, _, _>(
            [" 10.255.30.50 ,, 151.255.30.50 , 27.10.10.11 "],
            fwd.clone(),
        );

        assert_eq!(fwd.client(), Some("10.255.30.50"));
        assert_eq!(fwd.chain().count(), 3);
    }

    #[test]
    fn forwarded_for_ipv6_entries() {
        assert_parse_eq::<XForwardedFor, _, _>(
            ["[2001:db8:cafe::17]:4711, 2001:db8::1"],
            XForwardedFor(vec![
                "[2001:db8:cafe::17]:4711".to_owned(),
                "2001:db8::1".to_owned(),
            ]),
        );
    }

    #[test]
    fn serializing() {
        let mut fwd = XForwardedFor::default();
        fwd.push("203.0.113.43");
        fwd.push("[2001:db8::1]:443");

        assert_eq!(fwd.to_string(), "203.0.113.43, [2001:db8::1]:443");
        assert_eq!(
            fwd.try_into_value().unwrap(),
            "203.0.113.43, [2001:db8::1]:443"
        );

        assert_eq!(
            XRealIp("1.2.3.4".to_owned()).try_into_value().unwrap(),
            "1.2.3.4"
        );
    }
}
