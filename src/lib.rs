//! Resilient [Server-Sent Events](https://html.spec.whatwg.org/multipage/server-sent-events.html)
//! (SSE) client: an incremental parser that doesn't care how the transport chunks bytes, and a
//! subscription that reconnects on failure while keeping the server's resumption state.
//!
//! The crate is layered:
//!
//! - [`LineSegmenter`][segmenter::LineSegmenter] - splits raw chunks into lines on CR, LF or CRLF,
//!   holding back only the unfinished tail.
//! - [`MessageAssembler`][assembler::MessageAssembler] - applies lines to the message being built
//!   and reports `id`/`retry` changes as soon as they are seen.
//! - [`ByteStreamConsumer`][consumer::ByteStreamConsumer] - pulls chunks from any
//!   [`Stream`][futures_core::Stream] of bytes, in order.
//! - [`MessageStream`] - the three above as a [`Stream`][futures_core::Stream] of
//!   [`Message`]s, for when a dropped stream can't be resumed anyway.
//! - [`Subscription`] (requires `std`) - owns a logical stream across reconnects, sending the
//!   sticky `last-event-id` and honouring the server's `retry`.
//!
//! # Quick start with `reqwest`
//!
//! ```ignore
//! use ssefetch::{Handler, Message, Options};
//!
//! struct Print;
//!
//! impl Handler<reqwest::Response> for Print {
//!     fn on_message(&mut self, message: Message) {
//!         println!("{}: {}", message.event, message.data);
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let client = reqwest::Client::new();
//! ssefetch::reqwest::subscribe(client, "https://example.com/events", Options::new(), Print).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Bring your own transport
//!
//! Anything implementing [`Transport`] works, including a closure returning a
//! [`ResponseFuture`]. The transport gets a [`Request`] with the current header set and a
//! cancellation token for the attempt.
//!
//! # Parsing a single stream
//!
//! ```rust
//! use bytes::Bytes;
//! use futures::StreamExt;
//! use ssefetch::MessageStream;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let chunks = vec![
//!     Ok::<_, std::io::Error>(Bytes::from("data: hel")),
//!     Ok(Bytes::from("lo\n\ndata: world\n\n")),
//! ];
//! let mut stream = MessageStream::new(futures::stream::iter(chunks));
//!
//! while let Some(Ok(message)) = stream.next().await {
//!     println!("{}", message.data);
//! }
//! # }
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Description | no std? |
//! | --- | --- | --- | --- |
//! | `std` | on | [`Subscription`], [`Options`] and the [`Transport`] traits, plus std support in core dependencies. | false |
//! | `reqwest` | off | [`ReqwestTransport`] and [`reqwest::subscribe`][crate::reqwest::subscribe]. | false |
//! | `serde` | off | Derives [`Serialize`][::serde::Serialize] and [`Deserialize`][::serde::Deserialize] on [`Message`]. | false |
//!
//! With `default-features = false` the crate is `no_std` + `alloc` and provides the parsing
//! layers only.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod assembler;
pub(crate) mod constants;
pub mod consumer;
pub mod errors;
#[cfg(feature = "std")]
pub mod handler;
pub mod message;
pub mod message_stream;
#[cfg(feature = "std")]
pub mod options;
#[cfg(feature = "reqwest")]
pub mod reqwest;
#[cfg(feature = "std")]
pub mod retry;
pub mod segmenter;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod subscription;
#[cfg(feature = "std")]
pub mod transport;

pub use constants::{DEFAULT_RETRY_MILLIS, EVENT_STREAM_CONTENT_TYPE, LAST_EVENT_ID};
pub use message::Message;
pub use message_stream::MessageStream;

#[cfg(feature = "std")]
pub use {
    errors::{AttemptError, BoxError},
    handler::Handler,
    options::Options,
    retry::RetryDecision,
    subscription::{Subscription, subscribe},
    transport::{Request, Response, ResponseFuture, Transport},
};

#[cfg(feature = "reqwest")]
pub use crate::reqwest::ReqwestTransport;
