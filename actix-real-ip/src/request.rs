use std::borrow::Cow;

use actix_web::HttpRequest;
use real_ip::{RequestView, peer_addr_string};

/// A [`RequestView`] over an Actix Web request.
///
/// The peer address is the socket address of the connection, formatted as `ip:port` or
/// `[ip]:port` without any IPv6 scope id.
#[derive(Debug, Clone, Copy)]
pub struct ActixRequest<'a>(&'a HttpRequest);

impl<'a> ActixRequest<'a> {
    /// Wraps an Actix Web request.
    pub fn new(req: &'a HttpRequest) -> Self {
        Self(req)
    }
}

impl RequestView for ActixRequest<'_> {
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.0
            .headers()
            .get_all(name)
            .filter_map(|val| val.to_str().ok())
            .collect()
    }

    fn peer_addr(&self) -> Option<Cow<'_, str>> {
        self.0.peer_addr().map(|addr| Cow::Owned(peer_addr_string(addr)))
    }
}
