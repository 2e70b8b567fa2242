//! Output buffer with prompt detection on the trailing line.
//!
//! Only the last line of the buffer (bounded by `search_depth`) is tested
//! against prompt patterns, so a `#` or `>` inside command output is never
//! mistaken for the prompt and large outputs stay cheap to scan.

use std::fmt;

use bytes::BytesMut;
use memchr::memrchr;
use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Buffer for accumulating shell output, stripped of terminal escapes.
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: BytesMut,

    /// Escape sequence parser; keeps state across chunks.
    parser: Parser,

    /// How many bytes from the end may hold the prompt line.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            parser: Parser::new(),
            search_depth,
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = PlainText {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut sink, data);
    }

    /// The trailing line of the buffer, without leading carriage returns.
    pub fn last_line(&self) -> &[u8] {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        let tail = &self.buffer[start..];
        let line = match memrchr(b'\n', tail) {
            Some(pos) => &tail[pos + 1..],
            None => tail,
        };
        let skip = line.iter().take_while(|b| **b == b'\r').count();
        &line[skip..]
    }

    /// Index of the first pattern matching the trailing line.
    pub fn match_last_line(&self, patterns: &[&Regex]) -> Option<usize> {
        let line = self.last_line();
        if line.is_empty() {
            return None;
        }
        patterns.iter().position(|p| p.is_match(line))
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

/// vte performer keeping printable text and line control only.
struct PlainText<'a> {
    out: &'a mut BytesMut,
}

impl Perform for PlainText<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\r' | b'\t' => self.out.extend_from_slice(&[byte]),
            // pagers erase "--More--" with backspaces
            0x08 => {
                if self.out.last().is_some_and(|b| *b != b'\n') {
                    // erase a whole character, not a UTF-8 continuation byte
                    let start = self
                        .out
                        .iter()
                        .rposition(|b| b & 0xC0 != 0x80)
                        .unwrap_or(0);
                    self.out.truncate(start);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_slice(), b"Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_slice(), b"Green text");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"R1\x1b[");
        buffer.extend(b"0m#");
        assert_eq!(buffer.as_slice(), b"R1#");
    }

    #[test]
    fn test_backspace_erases() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"--More--\x08\x08\x08\x08\x08\x08\x08\x08line");
        assert_eq!(buffer.as_slice(), b"line");
    }

    #[test]
    fn test_backspace_erases_multibyte_char() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend("R1 µ".as_bytes());
        buffer.extend(b"\x08\x08#");
        assert_eq!(buffer.as_slice(), b"R1#");
        assert_eq!(buffer.as_str_lossy(), "R1#");
    }

    #[test]
    fn test_prompt_only_on_last_line() {
        let pattern = Regex::new(r"(?m)^R1#\s?$").unwrap();
        let mut buffer = PatternBuffer::new(100);

        buffer.extend(b"R1#\r\nInterface  IP-Address\r\n");
        assert_eq!(buffer.match_last_line(&[&pattern]), None);

        buffer.extend(b"\rR1#");
        assert_eq!(buffer.last_line(), b"R1#");
        assert_eq!(buffer.match_last_line(&[&pattern]), Some(0));
    }

    #[test]
    fn test_match_returns_pattern_index() {
        let prompt = Regex::new(r"#\s?$").unwrap();
        let password = Regex::new(r"(?i)^password:\s?$").unwrap();
        let mut buffer = PatternBuffer::new(100);

        buffer.extend(b"enable\r\nPassword: ");
        assert_eq!(buffer.match_last_line(&[&prompt, &password]), Some(1));
    }

    #[test]
    fn test_search_depth_bounds_last_line() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(&[b'x'; 100]);
        assert_eq!(buffer.last_line().len(), 10);
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), b"test data");
        assert!(buffer.is_empty());
    }
}
