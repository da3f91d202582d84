use actix_web::{ResponseError, http::StatusCode};
use derive_more::{Display, Error};

/// Errors that can occur when extracting a [`ClientIp`](crate::ClientIp).
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum RealIpError {
    /// No header or peer address held a usable client address.
    #[display("no usable client address found in request")]
    NotFound,
}

impl ResponseError for RealIpError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
