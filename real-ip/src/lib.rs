//! Resolution of the originating client address for requests that passed through reverse proxies.
//!
//! Proxies overwrite the transport peer address with their own, so the client's address has to be
//! recovered from forwarding headers. Those headers are attacker-controllable; this crate inspects
//! a fixed, ordered set of sources and returns the first one that holds a syntactically valid
//! address, copied verbatim from the request.
//!
//! # Precedence
//! 1. `True-Client-IP` (first non-empty value)
//! 2. `X-Real-IP` (first non-empty value)
//! 3. `X-Forwarded-For`, left to right, skipping private/reserved addresses
//! 4. the transport peer address
//!
//! A present but invalid single-value header ends resolution by default; see [`InvalidHeader`].
//!
//! # Examples
//! ```
//! use real_ip::{RawRequest, Resolver};
//!
//! let req = RawRequest::new()
//!     .with_header("X-Forwarded-For", "10.255.30.50, 151.255.30.50, 27.10.10.11")
//!     .with_peer_addr("10.0.0.1:51234");
//!
//! let ip = real_ip::resolve(&req).unwrap();
//! assert_eq!(ip.as_str(), "151.255.30.50");
//!
//! // keep private hops when every proxy in the chain is trusted to report its client
//! let resolver = Resolver::default().skip_private_forwarded(false);
//! assert_eq!(resolver.resolve(&req).unwrap().as_str(), "10.255.30.50");
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod header;
mod resolver;
pub mod shape;
mod source;
pub mod validate;

pub use self::{
    header::SourceHeader,
    resolver::{InvalidHeader, RealIp, Resolver, resolve},
    source::{Candidate, RawRequest, RequestView, Source, candidates, peer_addr_string},
};
