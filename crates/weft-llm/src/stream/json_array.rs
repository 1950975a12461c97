//! Unbounded-array framing
//!
//! Some backends stream one giant JSON array (`[{…},\n{…},…]`) with no
//! record delimiter at all. This decoder recovers each complete top-level
//! object from the growing byte buffer by tracking brace depth with full
//! string/escape awareness. The scan position is carried across feeds, so
//! already-consumed buffer content is never rescanned and a record split at
//! any byte offset (including inside a multi-byte character) reassembles
//! correctly.

use bytes::{Buf, BytesMut};

/// Incremental top-level-object extractor for a streamed JSON array
#[derive(Debug, Default)]
pub struct JsonArrayDecoder {
    buf: BytesMut,
    /// Next byte offset to scan; everything before it has been examined
    scan: usize,
    /// Offset of the current object's opening brace, if inside one
    start: Option<usize>,
    /// Brace depth inside the current object
    depth: u32,
    in_string: bool,
    escaped: bool,
}

impl JsonArrayDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every object completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut records = Vec::new();
        while self.scan < self.buf.len() {
            let byte = self.buf[self.scan];

            if self.start.is_none() {
                // Between objects: skip array punctuation and whitespace
                // until the next top-level opening brace
                if byte == b'{' {
                    self.start = Some(self.scan);
                    self.depth = 1;
                    self.in_string = false;
                    self.escaped = false;
                }
                self.scan += 1;
                continue;
            }

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
            } else {
                match byte {
                    b'"' => self.in_string = true,
                    b'{' => self.depth += 1,
                    b'}' => {
                        self.depth -= 1;
                        if self.depth == 0
                            && let Some(start) = self.start.take()
                        {
                            let record = &self.buf[start..=self.scan];
                            records.push(String::from_utf8_lossy(record).into_owned());

                            // Drop consumed bytes and rebase the scan position
                            self.buf.advance(self.scan + 1);
                            self.scan = 0;
                            continue;
                        }
                    }
                    _ => {}
                }
            }
            self.scan += 1;
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_objects_from_array_stream() {
        let mut decoder = JsonArrayDecoder::new();
        let records = decoder.feed(b"[{\"a\":1},\n{\"b\":2}");
        assert_eq!(records, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert!(decoder.feed(b",{\"c\":3}]").len() == 1);
    }

    #[test]
    fn nested_objects_and_arrays_stay_whole() {
        let mut decoder = JsonArrayDecoder::new();
        let records = decoder.feed(br#"[{"parts":[{"x":{"y":1}}],"n":2}]"#);
        assert_eq!(records, vec![r#"{"parts":[{"x":{"y":1}}],"n":2}"#]);
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let mut decoder = JsonArrayDecoder::new();
        let records = decoder.feed(br#"[{"text":"a } b { c \" }"}]"#);
        assert_eq!(records, vec![r#"{"text":"a } b { c \" }"}"#]);
    }

    #[test]
    fn escaped_backslash_before_quote_closes_string() {
        let mut decoder = JsonArrayDecoder::new();
        let records = decoder.feed(br#"[{"path":"C:\\"},{"b":2}]"#);
        assert_eq!(records, vec![r#"{"path":"C:\\"}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn byte_at_a_time_matches_contiguous() {
        let input = "[{\"text\":\"héllo\"},\n{\"call\":{\"name\":\"f\",\"args\":{\"q\":\"a,b\"}}}]".as_bytes();

        let mut contiguous = JsonArrayDecoder::new();
        let expected = contiguous.feed(input);

        let mut incremental = JsonArrayDecoder::new();
        let mut actual = Vec::new();
        for byte in input {
            actual.extend(incremental.feed(std::slice::from_ref(byte)));
        }

        assert_eq!(actual, expected);
        assert_eq!(actual.len(), 2);
        assert!(actual[0].contains("héllo"));
    }

    #[test]
    fn partial_object_is_held_until_complete() {
        let mut decoder = JsonArrayDecoder::new();
        assert!(decoder.feed(b"[{\"a\":").is_empty());
        assert!(decoder.feed(b"{\"b\":").is_empty());
        let records = decoder.feed(b"2}}");
        assert_eq!(records, vec!["{\"a\":{\"b\":2}}"]);
    }
}
