//! [`Error`][core::error::Error] types used across the crate

use alloc::{boxed::Box, string::String};

/// Error type for anything a caller hands back to the crate, such as a rejected response or a
/// fatal decision from [`Handler::on_error`][crate::handler::Handler::on_error]
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Why a single connection attempt failed. Every variant leads to the retry path.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError<E> {
    /// The transport couldn't produce a response
    #[error("transport error: {0}")]
    Transport(E),
    /// [`Handler::on_open`][crate::handler::Handler::on_open] rejected the response
    #[error("response rejected: {0}")]
    Open(BoxError),
    /// The body failed part way through
    #[error("stream read error: {0}")]
    StreamRead(E),
}

impl<E> AttemptError<E> {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn is_stream_read(&self) -> bool {
        matches!(self, Self::StreamRead(_))
    }
}

/// The response did not declare a `text/event-stream` body
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected content-type to be {expected}, got {}", .actual.as_deref().unwrap_or("nothing"))]
pub struct InvalidContentType {
    pub expected: &'static str,
    pub actual: Option<String>,
}

/// The response status was not a success
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unexpected response status {0}")]
pub struct UnexpectedStatus(pub u16);
