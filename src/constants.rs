use bytes_utils::Str;

pub(crate) const LF: u8 = b'\n';
pub(crate) const CR: u8 = b'\r';
pub(crate) const COLON: u8 = b':';
pub(crate) const SPACE: u8 = b' ';

pub(crate) const EMPTY_STR: Str = Str::from_static("");

/// Media type of an SSE response body, also the default `Accept` header
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Reconnect interval used until the server sends a `retry` field
pub const DEFAULT_RETRY_MILLIS: u64 = 1000;

/// Header carrying the sticky event id on reconnect
pub const LAST_EVENT_ID: &str = "last-event-id";
