//! [`Transport`] backed by [`reqwest`]

use http_body_util::BodyDataStream;
use reqwest::{Body, Client, Error as ReqwestError, RequestBuilder, StatusCode, header::HeaderMap};

use crate::{
    handler::Handler,
    options::Options,
    subscription::Subscription,
    transport::{Request, Response, ResponseFuture, Transport},
};

impl Response for reqwest::Response {
    type Error = ReqwestError;
    type Body = BodyDataStream<Body>;

    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    fn headers(&self) -> &HeaderMap {
        reqwest::Response::headers(self)
    }

    fn into_body(self) -> Self::Body {
        BodyDataStream::new(Body::from(self))
    }
}

/// Replays the request (method, headers, body) through a shared [`Client`] on every attempt
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ReqwestTransport {
    fn build(&self, request: Request) -> RequestBuilder {
        let Request {
            method,
            url,
            headers,
            body,
            ..
        } = request;
        let builder = self.client.request(method, url).headers(headers);
        match body {
            Some(body) => builder.body(body),
            None => builder,
        }
    }
}

impl Transport for ReqwestTransport {
    type Response = reqwest::Response;

    fn fetch(&mut self, request: Request) -> ResponseFuture<reqwest::Response> {
        // dropping the pending request aborts it, which is what disposing the attempt does
        Box::pin(self.build(request).send())
    }
}

/// [`subscribe`][crate::subscription::subscribe] with a [`ReqwestTransport`] around `client`
pub fn subscribe<H>(
    client: Client,
    url: impl Into<String>,
    options: Options,
    handler: H,
) -> Subscription<ReqwestTransport, H>
where
    H: Handler<reqwest::Response>,
{
    Subscription::new(url, options, handler, ReqwestTransport::new(client))
}
