use http::header::CONTENT_TYPE;

use crate::{
    constants::EVENT_STREAM_CONTENT_TYPE,
    errors::{AttemptError, BoxError, InvalidContentType, UnexpectedStatus},
    message::Message,
    retry::RetryDecision,
    transport::Response,
};

/// Lifecycle callbacks for a [`Subscription`][crate::subscription::Subscription].
///
/// All methods run inside the subscription's `poll`, so they should be quick and must not block.
pub trait Handler<R: Response> {
    /// Called once per successful transport call, before any byte of the body is read.
    /// Returning an error sends the attempt down the retry path.
    ///
    /// This runs synchronously and only sees the response head, so it can't read an error body
    /// before deciding. Reject here and inspect the failure in [`Handler::on_error`] instead.
    fn on_open(&mut self, response: &R) -> Result<(), BoxError> {
        validate_response(response)
    }

    fn on_message(&mut self, message: Message);

    /// The server ended the stream cleanly, no reconnect follows
    fn on_close(&mut self) {}

    /// An attempt failed. Not called once the subscription has been cancelled.
    fn on_error(&mut self, _error: AttemptError<R::Error>) -> RetryDecision {
        RetryDecision::RetryDefault
    }
}

/// Default [`Handler::on_open`]: a success status and a `text/event-stream` content type
pub fn validate_response<R: Response>(response: &R) -> Result<(), BoxError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UnexpectedStatus(status.as_u16()).into());
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    match content_type {
        Some(content_type) if content_type.starts_with(EVENT_STREAM_CONTENT_TYPE) => Ok(()),
        other => Err(InvalidContentType {
            expected: EVENT_STREAM_CONTENT_TYPE,
            actual: other.map(ToOwned::to_owned),
        }
        .into()),
    }
}
