use core::time::Duration;

use crate::errors::BoxError;

/// What [`Handler::on_error`][crate::handler::Handler::on_error] wants done after a failed attempt
#[derive(Debug, Default)]
pub enum RetryDecision {
    /// Reconnect after this delay, for this attempt only. The stored interval is left alone.
    Retry(Duration),
    /// Reconnect after the session's retry interval (server directed, or the configured default)
    #[default]
    RetryDefault,
    /// Give up, the subscription resolves with this error
    Fatal(BoxError),
}

impl RetryDecision {
    pub fn retry_after_millis(millis: u64) -> Self {
        Self::Retry(Duration::from_millis(millis))
    }

    pub fn fatal(error: impl Into<BoxError>) -> Self {
        Self::Fatal(error.into())
    }
}
