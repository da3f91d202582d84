use actix_utils::future::{Ready, err, ok};
use actix_web::{FromRequest, HttpRequest, dev};
use derive_more::Deref;
use real_ip::{RealIp, Resolver};
use tracing::debug;

use crate::{ActixRequest, RealIpError, middleware};

/// Extractor for the client address of a request that may have passed through proxies.
///
/// Uses the outcome recorded by [`ResolveRealIp`](crate::ResolveRealIp) if the middleware is
/// installed, including when it found nothing. Otherwise the address is resolved on demand using the [`Resolver`] in app data, or
/// the default resolver if none is configured.
///
/// Fails with [`RealIpError::NotFound`] when no address can be determined; use `Option<ClientIp>`
/// to handle that case in the handler instead.
///
/// # Examples
/// ```
/// use actix_real_ip::{ClientIp, Resolver};
/// use actix_web::{get, App, Responder};
///
/// #[get("/")]
/// async fn index(client_ip: ClientIp) -> impl Responder {
///     format!("{client_ip} (via {})", client_ip.source())
/// }
///
/// App::new()
///     .app_data(Resolver::default().skip_private_forwarded(false))
///     .service(index)
/// # ;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct ClientIp(pub RealIp);

impl_more::forward_display!(ClientIp);

impl ClientIp {
    /// Unwraps into the resolved address.
    pub fn into_inner(self) -> RealIp {
        self.0
    }
}

impl FromRequest for ClientIp {
    type Error = RealIpError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _pl: &mut dev::Payload) -> Self::Future {
        let resolved = match middleware::resolved(req) {
            Some(resolved) => resolved,
            None => {
                let view = ActixRequest::new(req);

                match req.app_data::<Resolver>() {
                    Some(resolver) => resolver.resolve(&view),
                    None => {
                        debug!("no `Resolver` in app data; using default client address resolver");
                        real_ip::resolve(&view)
                    }
                }
            }
        };

        match resolved {
            Some(ip) => ok(Self(ip)),
            None => err(RealIpError::NotFound),
        }
    }
}
