//! The unit delivered to callers once a blank line terminates an SSE block

use bytes_utils::Str;

use crate::constants::EMPTY_STR;

/// A fully assembled SSE message.
///
/// Fields a block never mentions keep their defaults: empty strings and no `retry`. `id` only
/// reflects an `id` field seen within this block, the sticky id used for resumption lives on the
/// subscription instead.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub data: Str,
    pub event: Str,
    pub id: Str,
    /// Reconnection delay in milliseconds, kept signed because the wire allows `retry: -1`
    pub retry: Option<i64>,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            data: EMPTY_STR,
            event: EMPTY_STR,
            id: EMPTY_STR,
            retry: None,
        }
    }
}
