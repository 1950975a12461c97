//! Line-per-record framing
//!
//! Splits an incoming byte stream on newlines, where every non-empty line is
//! one self-contained JSON record. The trailing unterminated fragment is
//! retained across feeds, so record and multi-byte character boundaries may
//! fall anywhere inside a network chunk.

use bytes::{Buf, BytesMut};

/// Incremental newline-delimited record decoder
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: BytesMut,
}

impl NdjsonDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every line completed by it
    ///
    /// Empty lines are dropped. Lines are decoded lossily: a complete line
    /// with invalid UTF-8 yields replacement characters rather than
    /// corrupting subsequent records.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.split_to(pos);
            self.buf.advance(1); // the newline itself
            if let Some(text) = non_empty_line(&line) {
                lines.push(text);
            }
        }
        lines
    }

    /// Flush the trailing fragment at end of stream
    ///
    /// A final record is not required to carry a newline terminator.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.buf.split();
        non_empty_line(&rest)
    }
}

fn non_empty_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
