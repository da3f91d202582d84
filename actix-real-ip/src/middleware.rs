use std::{
    future::{Ready, ready},
    rc::Rc,
};

use actix_web::{
    HttpMessage as _, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use real_ip::{RealIp, Resolver};
use tracing::debug;

use crate::ActixRequest;

/// Middleware that resolves the client address once per request and attaches it to the request.
///
/// Handlers and later middleware read it back with [`RealIpExt::real_ip`] or the
/// [`ClientIp`](crate::ClientIp) extractor. Requests with no usable address are passed through;
/// this middleware never rejects a request. The outcome is recorded either way, so the extractor
/// does not resolve again with a different policy.
///
/// # Examples
/// ```
/// use actix_real_ip::{InvalidHeader, ResolveRealIp, Resolver};
/// use actix_web::App;
///
/// let mw = ResolveRealIp::default();
/// let mw = ResolveRealIp::new(Resolver::default().on_invalid_header(InvalidHeader::FallThrough));
///
/// App::new().wrap(mw)
/// # ;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolveRealIp {
    resolver: Rc<Resolver>,
}

impl ResolveRealIp {
    /// Constructs middleware that resolves addresses using `resolver`.
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Rc::new(resolver),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ResolveRealIp
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>>,
{
    type Response = ServiceResponse<B>;
    type Error = S::Error;
    type Transform = ResolveRealIpMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResolveRealIpMiddleware {
            service,
            resolver: Rc::clone(&self.resolver),
        }))
    }
}

/// Middleware service implementation for [`ResolveRealIp`].
#[doc(hidden)]
#[allow(missing_debug_implementations)]
pub struct ResolveRealIpMiddleware<S> {
    service: S,
    resolver: Rc<Resolver>,
}

impl<S, B> Service<ServiceRequest> for ResolveRealIpMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>>,
{
    type Response = ServiceResponse<B>;
    type Error = S::Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let resolved = self.resolver.resolve(&ActixRequest::new(req.request()));

        if resolved.is_none() {
            debug!(path = req.path(), "could not resolve client address");
        }

        req.extensions_mut().insert(Resolved(resolved));

        self.service.call(req)
    }
}

/// Outcome recorded by [`ResolveRealIp`], including when nothing usable was found.
#[derive(Debug, Clone)]
struct Resolved(Option<RealIp>);

/// Returns the outcome recorded by [`ResolveRealIp`], or `None` if the middleware did not run.
pub(crate) fn resolved(req: &HttpRequest) -> Option<Option<RealIp>> {
    req.extensions().get::<Resolved>().map(|res| res.0.clone())
}

/// Access to the client address attached by [`ResolveRealIp`].
pub trait RealIpExt {
    /// Returns the attached client address.
    ///
    /// Returns `None` if the middleware is not installed or found no usable address.
    fn real_ip(&self) -> Option<RealIp>;
}

impl RealIpExt for HttpRequest {
    fn real_ip(&self) -> Option<RealIp> {
        resolved(self).flatten()
    }
}

impl RealIpExt for ServiceRequest {
    fn real_ip(&self) -> Option<RealIp> {
        resolved(self.request()).flatten()
    }
}
