use alloc::string::{String, ToString};
use core::time::Duration;

use bytes_utils::Str;
use http::{HeaderMap, HeaderName, HeaderValue, header::ACCEPT};

use crate::{constants::LAST_EVENT_ID, options::Options};

/// State that outlives individual connection attempts
#[derive(Debug, Clone)]
pub struct SessionState {
    headers: HeaderMap,
    last_event_id: Option<String>,
    retry_interval: Duration,
}

impl SessionState {
    pub fn new(options: &Options) -> Self {
        let mut headers = options.headers.clone();
        headers
            .entry(ACCEPT)
            .or_insert_with(|| options.default_accept.clone());

        // an id supplied up front is sticky like any other
        let last_event_id = headers
            .get(LAST_EVENT_ID)
            .and_then(|value| value.to_str().ok())
            .filter(|id| !id.is_empty())
            .map(ToString::to_string);
        if last_event_id.is_none() {
            headers.remove(LAST_EVENT_ID);
        }

        Self {
            headers,
            last_event_id,
            retry_interval: options.retry_interval,
        }
    }

    /// Headers for the next attempt
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Applies an `id` field. Empty clears the sticky id and stops sending the header.
    pub fn set_last_event_id(&mut self, id: Str) {
        if id.is_empty() {
            self.clear_last_event_id();
            return;
        }

        match HeaderValue::from_str(&id) {
            Ok(value) => {
                self.headers.insert(HeaderName::from_static(LAST_EVENT_ID), value);
                self.last_event_id = Some(id.to_string());
            }
            Err(_) => {
                tracing::warn!(id = &*id, "event id can't be sent as a header, forgetting it");
                self.clear_last_event_id();
            }
        }
    }

    /// Applies a `retry` field. Non-positive values mean reconnect straight away.
    pub fn set_retry(&mut self, millis: i64) {
        self.retry_interval = Duration::from_millis(u64::try_from(millis).unwrap_or(0));
    }

    fn clear_last_event_id(&mut self) {
        self.headers.remove(LAST_EVENT_ID);
        self.last_event_id = None;
    }
}
