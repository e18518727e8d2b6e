pub const DATA_LINE: &[u8] = b"data: {\"delta\":\"Hello, world!\"}\n";
pub const COMMENT_LINE: &[u8] = b": keepalive\r\n";
pub const EVENT_LINE: &[u8] = b"event: update\r";
pub const ID_LINE: &[u8] = b"id: 42\n";
pub const RETRY_LINE: &[u8] = b"retry: 2500\n";
pub const EMPTY_LINE: &[u8] = b"\r\n";
pub const NO_VALUE_LINE: &[u8] = b"data\n";
pub const NO_SPACE_LINE: &[u8] = b"data:value\n";

/// A single `data` line of roughly `len` bytes with some multi-byte characters mixed in
pub fn big_data_line(len: usize) -> Vec<u8> {
    let mut line = b"data: ".to_vec();
    let mut i = 0usize;
    while line.len() < len {
        if i % 37 == 0 {
            line.extend_from_slice("\u{1F431}".as_bytes());
        } else {
            line.push(b'a' + (i % 26) as u8);
        }
        i += 1;
    }
    line.push(b'\n');
    line
}

/// `n` messages, each built from every kind of line above with mixed terminators
pub fn generate_mixed(n: usize) -> Vec<u8> {
    let lines = [
        DATA_LINE,
        COMMENT_LINE,
        EVENT_LINE,
        ID_LINE,
        NO_VALUE_LINE,
        NO_SPACE_LINE,
        RETRY_LINE,
        EMPTY_LINE,
    ];
    let mut buf = Vec::with_capacity(lines.iter().map(|line| line.len()).sum::<usize>() * n);

    for _ in 0..n {
        for line in lines {
            buf.extend_from_slice(line);
        }
    }
    buf
}

/// Long model-output style stream: many small data messages
pub fn generate_token_stream(n: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    for i in 0..n {
        buf.extend_from_slice(format!("id: {i}\ndata: {{\"token\":\"tok{i}\"}}\n\n").as_bytes());
    }
    buf
}
