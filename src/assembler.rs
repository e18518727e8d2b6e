//! Turns [`LineSpan`]s into [`Message`]s
//!
//! Field semantics follow the `text/event-stream` grammar with one deliberate simplification:
//! a blank line always produces a message, even one with no data.

use alloc::string::String;

use bytes::Bytes;
use bytes_utils::{Str, StrMut};

use crate::{
    constants::{EMPTY_STR, SPACE},
    message::Message,
    segmenter::{LineSegmenter, LineSpan},
};

/// Something the caller has to act on after a line was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// An `id` field was seen, an empty value means the sticky id should be forgotten
    Id(Str),
    /// A `retry` field parsed as an integer number of milliseconds
    Retry(i64),
    /// A blank line closed the current block
    Message(Message),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldName {
    Data,
    Event,
    Id,
    Retry,
    Ignored,
}

impl FieldName {
    fn from_bytes(name: &[u8]) -> Self {
        match name {
            b"data" => Self::Data,
            b"event" => Self::Event,
            b"id" => Self::Id,
            b"retry" => Self::Retry,
            _ => Self::Ignored,
        }
    }
}

/// Decodes `bytes` as UTF-8 without copying when it is valid. Invalid sequences become U+FFFD
/// rather than an error so a single bad field can't take the stream down.
fn decode(bytes: Bytes) -> Str {
    match core::str::from_utf8(&bytes) {
        // Safety: just validated
        Ok(_) => unsafe { Str::from_inner_unchecked(bytes) },
        Err(_) => {
            let replaced = String::from_utf8_lossy(&bytes).into_owned();
            // Safety: came out of a String
            unsafe { Str::from_inner_unchecked(Bytes::from(replaced)) }
        }
    }
}

/// Lenient base-10 parse: leading whitespace, an optional sign, then at least one digit.
/// Anything after the digits is ignored.
pub(crate) fn parse_retry(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign_len = match value.as_bytes().first() {
        Some(b'-' | b'+') => 1,
        _ => 0,
    };

    let digits = value[sign_len..]
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(value.len() - sign_len);
    if digits == 0 {
        return None;
    }

    value[..sign_len + digits].parse().ok()
}

#[derive(Debug, Clone)]
pub struct MessageAssembler {
    data: StrMut,
    event: Str,
    id: Str,
    retry: Option<i64>,
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self {
            data: StrMut::new(),
            event: EMPTY_STR,
            id: EMPTY_STR,
            retry: None,
        }
    }
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one line to the message being built
    pub fn apply(&mut self, line: LineSpan) -> Option<Dispatch> {
        if line.is_empty() {
            let MessageAssembler {
                data,
                event,
                id,
                retry,
            } = core::mem::take(self);
            return Some(Dispatch::Message(Message {
                data: data.freeze(),
                event,
                id,
                retry,
            }));
        }

        // no colon means no value, a leading colon is a comment
        let field_len = match line.field_len {
            Some(0) | None => return None,
            Some(field_len) => field_len,
        };

        let LineSpan { bytes, .. } = line;
        let name = FieldName::from_bytes(&bytes[..field_len]);
        let value_start = if bytes.get(field_len + 1) == Some(&SPACE) {
            field_len + 2
        } else {
            field_len + 1
        };
        let value = decode(bytes.slice(value_start..));

        match name {
            FieldName::Data => {
                if self.data.is_empty() {
                    self.data.push_str(&value);
                } else {
                    self.data.push('\n');
                    self.data.push_str(&value);
                }
                None
            }
            FieldName::Event => {
                self.event = value;
                None
            }
            FieldName::Id => {
                self.id = value.clone();
                Some(Dispatch::Id(value))
            }
            FieldName::Retry => match parse_retry(&value) {
                Some(retry) => {
                    self.retry = Some(retry);
                    Some(Dispatch::Retry(retry))
                }
                None => {
                    tracing::trace!(value = &*value, "ignoring unparseable retry field");
                    None
                }
            },
            FieldName::Ignored => None,
        }
    }
}

/// A [`LineSegmenter`] feeding a [`MessageAssembler`], one per connection attempt
#[derive(Debug, Default)]
pub struct Pipeline {
    segmenter: LineSegmenter,
    assembler: MessageAssembler,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk through both stages, handing every [`Dispatch`] to `sink` in stream order
    pub fn feed<F>(&mut self, chunk: Bytes, mut sink: F)
    where
        F: FnMut(Dispatch),
    {
        let assembler = &mut self.assembler;
        self.segmenter.feed(chunk, |line| {
            if let Some(dispatch) = assembler.apply(line) {
                sink(dispatch);
            }
        });
    }

    /// Bytes of an unterminated line currently held by the segmenter
    pub fn buffered_len(&self) -> usize {
        self.segmenter.buffered_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn run(chunks: &[&'static str]) -> Vec<Dispatch> {
        let mut pipeline = Pipeline::new();
        let mut out = Vec::new();
        for chunk in chunks {
            pipeline.feed(Bytes::from_static(chunk.as_bytes()), |d| out.push(d));
        }
        out
    }

    fn messages(chunks: &[&'static str]) -> Vec<Message> {
        run(chunks)
            .into_iter()
            .filter_map(|d| match d {
                Dispatch::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn data(value: &'static str) -> Message {
        Message {
            data: Str::from_static(value),
            ..Message::default()
        }
    }

    #[test]
    fn leading_space_stripping() {
        assert_eq!(messages(&["data:hello\n\n"]), vec![data("hello")]);
        assert_eq!(messages(&["data: hello\n\n"]), vec![data("hello")]);
        assert_eq!(messages(&["data:  hello\n\n"]), vec![data(" hello")]);
    }

    #[test]
    fn data_lines_join_with_newlines() {
        assert_eq!(
            messages(&["data: YHOO\ndata: +2\ndata: 10\n\n"]),
            vec![data("YHOO\n+2\n10")]
        );
    }

    #[test]
    fn empty_data_before_more_data_is_replaced() {
        assert_eq!(messages(&["data:\ndata: x\n\n"]), vec![data("x")]);
    }

    #[test]
    fn every_blank_line_emits_a_message() {
        assert_eq!(
            messages(&["\n\ndata: a\n\n"]),
            vec![Message::default(), Message::default(), data("a")]
        );
    }

    #[test]
    fn comments_and_unknown_fields_are_ignored() {
        assert_eq!(
            messages(&[": keepalive\nfoo: bar\ndata\ndata: x\n\n"]),
            vec![data("x")]
        );
    }

    #[test]
    fn fields_reset_after_each_message() {
        assert_eq!(
            messages(&["event: add\nid: 7\nretry: 10\ndata: 1\n\ndata: 2\n\n"]),
            vec![
                Message {
                    data: Str::from_static("1"),
                    event: Str::from_static("add"),
                    id: Str::from_static("7"),
                    retry: Some(10),
                },
                data("2"),
            ]
        );
    }

    #[test]
    fn id_is_reported_when_applied_even_if_empty() {
        assert_eq!(
            run(&["id: 1\n", "id:\n", "data: x\n"]),
            vec![
                Dispatch::Id(Str::from_static("1")),
                Dispatch::Id(Str::from_static(""))
            ]
        );
        // no id field, no notification
        assert_eq!(run(&["data: x\n\n"]), vec![Dispatch::Message(data("x"))]);
    }

    #[test]
    fn retry_parsing() {
        assert_eq!(run(&["retry: abc\n"]), vec![]);
        assert_eq!(run(&["retry: 3000\n"]), vec![Dispatch::Retry(3000)]);
        assert_eq!(run(&["retry:0\n"]), vec![Dispatch::Retry(0)]);
        assert_eq!(run(&["retry: -5\n"]), vec![Dispatch::Retry(-5)]);
        assert_eq!(parse_retry("  42ms"), Some(42));
        assert_eq!(parse_retry("+7"), Some(7));
        assert_eq!(parse_retry(""), None);
        assert_eq!(parse_retry("-"), None);
        assert_eq!(parse_retry("99999999999999999999999"), None);
        assert_eq!(parse_retry("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_retry("9223372036854775808"), None);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut pipeline = Pipeline::new();
        let mut out = Vec::new();
        pipeline.feed(Bytes::from_static(b"data: a\xFFb\n\n"), |d| out.push(d));
        assert_eq!(out, vec![Dispatch::Message(data("a\u{FFFD}b"))]);
    }

    #[test]
    fn ids_and_data_in_order() {
        assert_eq!(
            run(&["id: 1\ndata: A\n\n", "id: 2\ndata: B\n\n"]),
            vec![
                Dispatch::Id(Str::from_static("1")),
                Dispatch::Message(Message {
                    data: Str::from_static("A"),
                    id: Str::from_static("1"),
                    ..Message::default()
                }),
                Dispatch::Id(Str::from_static("2")),
                Dispatch::Message(Message {
                    data: Str::from_static("B"),
                    id: Str::from_static("2"),
                    ..Message::default()
                }),
            ]
        );
    }
}
