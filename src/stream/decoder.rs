//! Incremental bytes-to-lines decoder for one stream.
//!
//! Network reads carry no alignment guarantees: a chunk may end in the
//! middle of a line, a JSON payload, or a multi-byte UTF-8 character. The
//! decoder owns the buffering that re-establishes line boundaries.

use memchr::memchr_iter;
use smallvec::SmallVec;

/// Per-chunk batch of decoded lines. Streams rarely carry more than a
/// handful of lines per read.
pub type LineBatch = SmallVec<[String; 8]>;

/// Stateful decoder that turns raw byte chunks into trimmed lines.
///
/// Feed it chunks in arrival order; complete lines (up to `\n`, with
/// surrounding whitespace trimmed) come out, the unterminated remainder
/// stays buffered for the next chunk. Bytes that end mid-character are
/// carried over so a split multi-byte character is never corrupted.
pub struct LineDecoder {
    buffer: String,
    read_offset: usize,
    utf8_remainder: Vec<u8>,
}

impl LineDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            read_offset: 0,
            utf8_remainder: Vec::new(),
        }
    }

    /// Feed one byte chunk and append every completed line to `out`.
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut LineBatch) {
        if self.utf8_remainder.is_empty() {
            match std::str::from_utf8(chunk) {
                Ok(text) => self.feed_text_into(text, out),
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    // Safety: valid_up_to is guaranteed to be a valid UTF-8 boundary.
                    let text = unsafe { std::str::from_utf8_unchecked(&chunk[..valid_up_to]) };
                    self.feed_text_into(text, out);
                    self.utf8_remainder.extend_from_slice(&chunk[valid_up_to..]);
                }
            }
            return;
        }

        self.utf8_remainder.extend_from_slice(chunk);
        match std::str::from_utf8(self.utf8_remainder.as_slice()) {
            Ok(text) => {
                // Move the decoded text out before clearing the remainder.
                let text = text.to_string();
                self.utf8_remainder.clear();
                self.feed_text_into(&text, out);
            }
            Err(e) => {
                let valid_up_to = e.valid_up_to();
                if valid_up_to > 0 {
                    // Safety: valid_up_to is guaranteed to be a valid UTF-8 boundary.
                    let text = unsafe {
                        std::str::from_utf8_unchecked(&self.utf8_remainder[..valid_up_to])
                    }
                    .to_string();
                    let remain_len = self.utf8_remainder.len() - valid_up_to;
                    self.utf8_remainder.copy_within(valid_up_to.., 0);
                    self.utf8_remainder.truncate(remain_len);
                    self.feed_text_into(&text, out);
                }
            }
        }
    }

    fn feed_text_into(&mut self, text: &str, out: &mut LineBatch) {
        self.buffer.push_str(text);
        let mut processed_up_to = self.read_offset;
        let bytes = self.buffer.as_bytes();
        let scan_start = processed_up_to;
        for rel_pos in memchr_iter(b'\n', &bytes[scan_start..]) {
            let line_end = scan_start + rel_pos;
            let line = self.buffer[processed_up_to..line_end].trim();
            out.push(line.to_string());
            processed_up_to = line_end + 1;
        }

        self.read_offset = processed_up_to;
        if self.read_offset == self.buffer.len() {
            self.buffer.clear();
            self.read_offset = 0;
            return;
        }
        let should_compact = self.read_offset > 0
            && (self.read_offset >= self.buffer.len() / 2 || self.read_offset >= 8 * 1024);
        if should_compact {
            self.buffer.drain(..self.read_offset);
            self.read_offset = 0;
        }
    }

    /// End-of-stream: surface a trailing unterminated `data:` line, if any.
    ///
    /// Anything else left in the buffer (including an incomplete multi-byte
    /// character) is discarded.
    pub fn finish(&mut self) -> Option<String> {
        if !self.utf8_remainder.is_empty() {
            tracing::debug!(
                bytes = self.utf8_remainder.len(),
                "discarding incomplete UTF-8 sequence at end of stream"
            );
            self.utf8_remainder.clear();
        }
        let tail = self.buffer[self.read_offset..].trim();
        let result = if tail.starts_with("data:") {
            Some(tail.to_string())
        } else {
            None
        };
        self.buffer.clear();
        self.read_offset = 0;
        result
    }

    /// Whether undecoded input is still buffered.
    #[must_use]
    pub fn has_buffered(&self) -> bool {
        self.read_offset < self.buffer.len() || !self.utf8_remainder.is_empty()
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}
