//! The seam between the subscription and whatever actually speaks HTTP

use alloc::string::String;

use bytes::Bytes;
use futures_core::{Stream, future::BoxFuture};
use http::{HeaderMap, Method, StatusCode};
use tokio_util::sync::CancellationToken;

/// Everything a transport needs for one connection attempt
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Caller headers plus `Accept` and, when a sticky id exists, `last-event-id`
    pub headers: HeaderMap,
    /// Cancelled when the attempt is abandoned, transports may use it to abort early
    pub signal: CancellationToken,
    /// Sent unchanged with every attempt
    pub body: Option<Bytes>,
}

/// A response whose body is a stream of byte chunks
pub trait Response {
    type Error: core::error::Error + Send + Sync + 'static;
    type Body: Stream<Item = Result<Bytes, Self::Error>>;

    fn status(&self) -> StatusCode;

    fn headers(&self) -> &HeaderMap;

    fn into_body(self) -> Self::Body;
}

pub type ResponseFuture<R> = BoxFuture<'static, Result<R, <R as Response>::Error>>;

/// Performs one HTTP request per connection attempt.
///
/// Implemented for any `FnMut(Request) -> ResponseFuture<R>` so a closure can serve as the
/// transport.
pub trait Transport {
    type Response: Response;

    fn fetch(&mut self, request: Request) -> ResponseFuture<Self::Response>;
}

impl<F, R> Transport for F
where
    F: FnMut(Request) -> ResponseFuture<R>,
    R: Response,
{
    type Response = R;

    fn fetch(&mut self, request: Request) -> ResponseFuture<R> {
        self(request)
    }
}
