//! Extractor and middleware for client addresses when proxied through load balancers.
//!
//! Resolution itself is done by the [`real_ip`] crate; this crate connects it to Actix Web.
//!
//! - [`ResolveRealIp`] middleware resolves once per request and attaches the result to request
//!   extensions, where [`RealIpExt::real_ip`] reads it back.
//! - [`ClientIp`] extractor uses the attached value, or resolves on demand using the [`Resolver`]
//!   in app data.
//! - [`TrueClientIp`], [`XRealIp`], and [`XForwardedFor`] are typed versions of the headers that
//!   are consulted.
//!
//! # Examples
//! ```
//! use actix_real_ip::{ClientIp, ResolveRealIp};
//! use actix_web::{get, App, Responder};
//!
//! #[get("/")]
//! async fn index(client_ip: ClientIp) -> impl Responder {
//!     format!("Hello, {client_ip}")
//! }
//!
//! App::new().wrap(ResolveRealIp::default()).service(index)
//! # ;
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod error;
mod extract;
mod header;
mod middleware;
mod request;

pub use real_ip::{InvalidHeader, RealIp, Resolver, Source};

pub use self::{
    error::RealIpError,
    extract::ClientIp,
    header::{TRUE_CLIENT_IP, TrueClientIp, XForwardedFor, XRealIp, X_FORWARDED_FOR, X_REAL_IP},
    middleware::{RealIpExt, ResolveRealIp},
    request::ActixRequest,
};
