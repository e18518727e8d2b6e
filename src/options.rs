//! Construction parameters for a [`Subscription`][crate::subscription::Subscription]

use core::time::Duration;

use bytes::Bytes;

use http::{HeaderMap, HeaderName, HeaderValue, Method, header::InvalidHeaderValue};
use tokio_util::sync::CancellationToken;

use crate::constants::{DEFAULT_RETRY_MILLIS, EVENT_STREAM_CONTENT_TYPE, LAST_EVENT_ID};

/// Headers, retry interval and cancellation for one subscription.
///
/// ```rust
/// use std::time::Duration;
/// use ssefetch::Options;
///
/// let options = Options::new()
///     .retry_interval(Duration::from_secs(3))
///     .last_event_id("42")
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    pub(crate) method: Method,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
    pub(crate) default_accept: HeaderValue,
    pub(crate) retry_interval: Duration,
    pub(crate) signal: CancellationToken,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            default_accept: HeaderValue::from_static(EVENT_STREAM_CONTENT_TYPE),
            retry_interval: Duration::from_millis(DEFAULT_RETRY_MILLIS),
            signal: CancellationToken::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request method, `GET` unless set
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Request body sent with every attempt, for endpoints that stream back the answer to a `POST`
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a header sent with every attempt, replacing any previous value for `name`
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces the whole header set
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// `Accept` value used when the header set doesn't carry one
    pub fn default_accept(mut self, value: HeaderValue) -> Self {
        self.default_accept = value;
        self
    }

    /// Resume from an id seen in an earlier session
    pub fn last_event_id(mut self, id: &str) -> Result<Self, InvalidHeaderValue> {
        let value = HeaderValue::from_str(id)?;
        self.headers.insert(HeaderName::from_static(LAST_EVENT_ID), value);
        Ok(self)
    }

    /// Delay between attempts until the server sends its own `retry`
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Token that ends the subscription when cancelled
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = signal;
        self
    }
}
