//! Reconnecting SSE subscription
//!
//! A [`Subscription`] owns one logical stream across any number of connection attempts. Each
//! attempt goes through the [`Transport`], gets a fresh [`Pipeline`] and reports to the
//! [`Handler`]. Session state (sticky id, retry interval, headers) lives on the subscription and
//! survives reconnects.
//!
//! ```text
//! Idle -> Connecting -> Streaming --clean end--> Disposed
//!  ^          |             |
//!  |          +---error-----+--> Retrying --delay--> Idle
//!  |                                 |
//!  +---------------------------------+
//! ```
//!
//! Cancelling the [`Options::signal`] token disposes the subscription from any state and
//! resolves it with `Ok(())`.

use alloc::string::String;
use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
    time::Duration,
};

use bytes::Bytes;
use futures_timer::Delay;
use http::{HeaderMap, Method};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::{
    assembler::{Dispatch, Pipeline},
    consumer::ByteStreamConsumer,
    errors::{AttemptError, BoxError},
    handler::Handler,
    options::Options,
    retry::RetryDecision,
    session::SessionState,
    transport::{Request, Response, ResponseFuture, Transport},
};

type ResponseOf<T> = <T as Transport>::Response;
type ErrorOf<T> = <ResponseOf<T> as Response>::Error;
type BodyOf<T> = <ResponseOf<T> as Response>::Body;

enum AttemptState<T: Transport> {
    /// Next poll starts a new attempt
    Idle,
    Connecting(ResponseFuture<ResponseOf<T>>),
    Streaming {
        consumer: Pin<Box<ByteStreamConsumer<BodyOf<T>>>>,
        pipeline: Pipeline,
    },
    Retrying(Delay),
    Disposed,
}

/// Starts a subscription to `url`. Nothing happens until the returned future is polled.
pub fn subscribe<T, H>(
    url: impl Into<String>,
    options: Options,
    handler: H,
    transport: T,
) -> Subscription<T, H>
where
    T: Transport,
    H: Handler<T::Response>,
{
    Subscription::new(url, options, handler, transport)
}

/// Future driving one logical SSE subscription, resolves once it is over.
///
/// It resolves with `Ok(())` when the server closes the stream cleanly or the subscription is
/// cancelled, and with `Err` only when [`Handler::on_error`] returns [`RetryDecision::Fatal`].
#[must_use = "futures do nothing unless polled"]
pub struct Subscription<T: Transport, H> {
    method: Method,
    url: String,
    body: Option<Bytes>,
    transport: T,
    handler: H,
    session: SessionState,
    signal: CancellationToken,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    /// Child of `signal` for the attempt in flight
    attempt_signal: Option<CancellationToken>,
    attempts: usize,
    state: AttemptState<T>,
}

// nothing in here is ever pinned structurally, the body stream is boxed separately
impl<T: Transport, H> Unpin for Subscription<T, H> {}

impl<T, H> Subscription<T, H>
where
    T: Transport,
    H: Handler<T::Response>,
{
    pub fn new(url: impl Into<String>, options: Options, handler: H, transport: T) -> Self {
        let session = SessionState::new(&options);
        let Options {
            method,
            body,
            signal,
            ..
        } = options;
        Self {
            method,
            url: url.into(),
            body,
            transport,
            handler,
            session,
            cancelled: Box::pin(signal.clone().cancelled_owned()),
            signal,
            attempt_signal: None,
            attempts: 0,
            state: AttemptState::Idle,
        }
    }
}

impl<T: Transport, H> Subscription<T, H> {
    /// Token that cancels this subscription
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.signal
    }

    /// Sticky id sent as `last-event-id` on the next attempt
    pub fn last_event_id(&self) -> Option<&str> {
        self.session.last_event_id()
    }

    /// Delay used when [`Handler::on_error`] doesn't pick one
    pub fn retry_interval(&self) -> Duration {
        self.session.retry_interval()
    }

    /// Headers the next attempt will send
    pub fn headers(&self) -> &HeaderMap {
        self.session.headers()
    }

    /// Number of transport calls made so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, AttemptState::Disposed)
    }

    fn connect(&mut self) {
        self.attempts += 1;
        let signal = self.signal.child_token();
        let request = Request {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.session.headers().clone(),
            signal: signal.clone(),
            body: self.body.clone(),
        };

        tracing::debug!(
            attempt = self.attempts,
            method = %self.method,
            url = %self.url,
            last_event_id = ?self.session.last_event_id(),
            "connecting"
        );
        self.attempt_signal = Some(signal);
        self.state = AttemptState::Connecting(self.transport.fetch(request));
    }

    fn end_attempt(&mut self) {
        if let Some(signal) = self.attempt_signal.take() {
            signal.cancel();
        }
    }

    fn dispose(&mut self) {
        self.end_attempt();
        self.state = AttemptState::Disposed;
    }
}

impl<T, H> Subscription<T, H>
where
    T: Transport,
    H: Handler<T::Response>,
{
    /// Routes a failed attempt through [`Handler::on_error`]. Returns the final result if the
    /// subscription is over, otherwise a retry has been scheduled.
    fn fail(&mut self, error: AttemptError<ErrorOf<T>>) -> Option<Result<(), BoxError>> {
        if self.signal.is_cancelled() {
            tracing::debug!(attempt = self.attempts, %error, "attempt failed after cancellation");
            self.dispose();
            return Some(Ok(()));
        }

        tracing::warn!(attempt = self.attempts, %error, "connection attempt failed");
        self.end_attempt();

        let delay = match self.handler.on_error(error) {
            RetryDecision::Retry(delay) => delay,
            RetryDecision::RetryDefault => self.session.retry_interval(),
            RetryDecision::Fatal(error) => {
                tracing::warn!(%error, "giving up on subscription");
                self.dispose();
                return Some(Err(error));
            }
        };

        tracing::debug!(?delay, "scheduling reconnect");
        self.state = AttemptState::Retrying(Delay::new(delay));
        None
    }
}

impl<T, H> Future for Subscription<T, H>
where
    T: Transport,
    H: Handler<T::Response>,
{
    type Output = Result<(), BoxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            if this.is_terminated() {
                return Poll::Ready(Ok(()));
            }

            if this.cancelled.as_mut().poll(cx).is_ready() {
                tracing::debug!(attempts = this.attempts, "subscription cancelled");
                this.dispose();
                return Poll::Ready(Ok(()));
            }

            let error = match &mut this.state {
                AttemptState::Idle => {
                    this.connect();
                    continue;
                }
                AttemptState::Connecting(future) => match ready!(future.as_mut().poll(cx)) {
                    Ok(response) => match this.handler.on_open(&response) {
                        Ok(()) => {
                            tracing::debug!(
                                attempt = this.attempts,
                                status = response.status().as_u16(),
                                "stream open"
                            );
                            this.state = AttemptState::Streaming {
                                consumer: Box::pin(ByteStreamConsumer::new(response.into_body())),
                                pipeline: Pipeline::new(),
                            };
                            continue;
                        }
                        Err(e) => AttemptError::Open(e),
                    },
                    Err(e) => AttemptError::Transport(e),
                },
                AttemptState::Streaming { consumer, pipeline } => {
                    match ready!(consumer.as_mut().poll_next_chunk(cx)) {
                        Some(Ok(chunk)) => {
                            let signal = &this.signal;
                            let session = &mut this.session;
                            let handler = &mut this.handler;
                            pipeline.feed(chunk, |dispatch| {
                                // the rest of the chunk is dropped once someone cancels mid-way
                                if signal.is_cancelled() {
                                    return;
                                }
                                match dispatch {
                                    Dispatch::Id(id) => session.set_last_event_id(id),
                                    Dispatch::Retry(millis) => session.set_retry(millis),
                                    Dispatch::Message(message) => handler.on_message(message),
                                }
                            });
                            // cancellation is rechecked before the next chunk
                            continue;
                        }
                        Some(Err(e)) => AttemptError::StreamRead(e),
                        None => {
                            tracing::debug!(attempt = this.attempts, "stream closed by server");
                            this.handler.on_close();
                            this.dispose();
                            return Poll::Ready(Ok(()));
                        }
                    }
                }
                AttemptState::Retrying(delay) => {
                    ready!(Pin::new(delay).poll(cx));
                    this.state = AttemptState::Idle;
                    continue;
                }
                AttemptState::Disposed => return Poll::Ready(Ok(())),
            };

            if let Some(result) = this.fail(error) {
                return Poll::Ready(result);
            }
        }
    }
}
