//! Incremental line splitting for SSE byte streams
//!
//! [`LineSegmenter`] turns arbitrarily chunked bytes into [`LineSpan`]s. A line may be terminated
//! by CR, LF or CRLF and the CRLF pair may straddle two chunks. Only the unterminated tail is ever
//! kept between calls, so memory is bounded by the longest line rather than the stream.

use bytes::{Bytes, BytesMut};

use crate::constants::{COLON, CR, LF};

/// One line from the stream without its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub bytes: Bytes,
    /// Offset of the first colon in the line, [None] if the line has no colon
    pub field_len: Option<usize>,
}

impl LineSpan {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct LineSegmenter {
    /// Unconsumed bytes, empty when every line seen so far has been emitted
    buffer: Bytes,
    /// Scan cursor into `buffer`, everything before it has been looked at already
    position: usize,
    field_len: Option<usize>,
    /// Set after a CR ended a line so a following LF is swallowed, even in the next chunk
    discard_trailing_lf: bool,
}

impl LineSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes held back waiting for a line terminator
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds one chunk, calling `on_line` for every line it completes in order.
    ///
    /// A trailing partial line is kept and finished by a later chunk.
    pub fn feed<F>(&mut self, chunk: Bytes, mut on_line: F)
    where
        F: FnMut(LineSpan),
    {
        if chunk.is_empty() {
            return;
        }

        if self.buffer.is_empty() {
            // nothing pending so the chunk can be scanned in place
            self.buffer = chunk;
            self.position = 0;
        } else {
            let mut joined = BytesMut::with_capacity(self.buffer.len() + chunk.len());
            joined.extend_from_slice(&self.buffer);
            joined.extend_from_slice(&chunk);
            self.buffer = joined.freeze();
        }

        let len = self.buffer.len();
        let mut line_start = 0;

        while self.position < len {
            if self.discard_trailing_lf {
                if self.buffer[self.position] == LF {
                    self.position += 1;
                    line_start = self.position;
                }
                self.discard_trailing_lf = false;
            }

            let Some(line_end) = self.scan_line(line_start) else {
                break;
            };

            on_line(LineSpan {
                bytes: self.buffer.slice(line_start..line_end),
                field_len: self.field_len.take(),
            });
            line_start = self.position;
        }

        if line_start == len {
            self.buffer = Bytes::new();
            self.position = 0;
        } else if line_start != 0 {
            self.buffer = self.buffer.slice(line_start..);
            self.position -= line_start;
        }
    }

    /// Advances the cursor to just past the next terminator and returns the index it sits at.
    /// Returns [None] with the cursor at the end of the buffer if the line is unfinished.
    fn scan_line(&mut self, line_start: usize) -> Option<usize> {
        let len = self.buffer.len();

        while self.position < len {
            let rest = &self.buffer[self.position..];
            // once the colon is known only terminators matter
            let found = match self.field_len {
                Some(_) => memchr::memchr2(CR, LF, rest),
                None => memchr::memchr3(COLON, CR, LF, rest),
            };

            let Some(offset) = found else {
                self.position = len;
                return None;
            };

            let at = self.position + offset;
            self.position = at + 1;

            match self.buffer[at] {
                COLON => {
                    if self.field_len.is_none() {
                        self.field_len = Some(at - line_start);
                    }
                }
                CR => {
                    self.discard_trailing_lf = true;
                    return Some(at);
                }
                _ => return Some(at),
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn lines(chunks: &[&'static [u8]]) -> Vec<(Bytes, Option<usize>)> {
        let mut segmenter = LineSegmenter::new();
        let mut out = Vec::new();
        for chunk in chunks {
            segmenter.feed(Bytes::from_static(chunk), |line| {
                out.push((line.bytes, line.field_len))
            });
        }
        out
    }

    fn text(chunks: &[&'static [u8]]) -> Vec<Bytes> {
        lines(chunks).into_iter().map(|(bytes, _)| bytes).collect()
    }

    #[test]
    fn each_terminator_ends_one_line() {
        assert_eq!(text(&[b"a\r\n"]), vec![Bytes::from_static(b"a")]);
        assert_eq!(text(&[b"a\n"]), vec![Bytes::from_static(b"a")]);
        assert_eq!(text(&[b"a\r"]), vec![Bytes::from_static(b"a")]);
    }

    #[test]
    fn crlf_split_across_chunks_is_one_break() {
        assert_eq!(
            text(&[b"a\r", b"\nb\n"]),
            vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")]
        );
        // with an empty chunk wedged between the pair
        assert_eq!(
            text(&[b"a\r", b"", b"\nb\n"]),
            vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")]
        );
    }

    #[test]
    fn lone_crs_are_separate_breaks() {
        assert_eq!(
            text(&[b"a\r\rb\r"]),
            vec![
                Bytes::from_static(b"a"),
                Bytes::from_static(b""),
                Bytes::from_static(b"b")
            ]
        );
    }

    #[test]
    fn lf_after_cr_lf_is_a_blank_line() {
        assert_eq!(
            text(&[b"a\r\n\n"]),
            vec![Bytes::from_static(b"a"), Bytes::from_static(b"")]
        );
    }

    #[test]
    fn partial_lines_wait_for_a_terminator() {
        let mut segmenter = LineSegmenter::new();
        let mut out = Vec::new();

        segmenter.feed(Bytes::from_static(b"data: hel"), |line| out.push(line));
        assert!(out.is_empty());
        assert_eq!(segmenter.buffered_len(), 9);

        segmenter.feed(Bytes::from_static(b"lo\nda"), |line| out.push(line));
        assert_eq!(
            out,
            vec![LineSpan {
                bytes: Bytes::from_static(b"data: hello"),
                field_len: Some(4),
            }]
        );
        // only the unfinished remainder is retained
        assert_eq!(segmenter.buffered_len(), 2);

        segmenter.feed(Bytes::from_static(b"ta\n"), |line| out.push(line));
        assert_eq!(out[1].bytes, Bytes::from_static(b"data"));
        assert_eq!(out[1].field_len, None);
        assert_eq!(segmenter.buffered_len(), 0);
    }

    #[test]
    fn field_len_is_the_first_colon() {
        assert_eq!(
            lines(&[b"data: a:b\n"]),
            vec![(Bytes::from_static(b"data: a:b"), Some(4))]
        );
        assert_eq!(
            lines(&[b": comment\n"]),
            vec![(Bytes::from_static(b": comment"), Some(0))]
        );
        assert_eq!(lines(&[b"\n"]), vec![(Bytes::new(), None)]);
    }

    #[test]
    fn field_len_survives_a_chunk_boundary() {
        assert_eq!(
            lines(&[b"ev", b"ent:", b"x:y", b"\r\n"]),
            vec![(Bytes::from_static(b"event:x:y"), Some(5))]
        );
        // colon found in an earlier chunk after the buffer was rebased
        assert_eq!(
            lines(&[b"a\nid:1", b"2:3\n"]),
            vec![
                (Bytes::from_static(b"a"), None),
                (Bytes::from_static(b"id:12:3"), Some(2))
            ]
        );
    }

    #[test]
    fn empty_chunks_are_ignored() {
        assert_eq!(text(&[b"", b"", b"x\n", b""]), vec![Bytes::from_static(b"x")]);
    }

    #[test]
    fn byte_at_a_time_matches_one_chunk() {
        let whole: &'static [u8] = b"id: 1\r\ndata:a\rdata: b\n\n: c\r\n\r\nevent:e\n";
        let single: Vec<&'static [u8]> = (0..whole.len()).map(|i| &whole[i..i + 1]).collect();
        assert_eq!(lines(&[whole]), lines(&single));
    }
}
