//! Byte scanner with bounded unscan, used by the tokenizer.
//!
//! Invariant: we scan by byte, but any slice endpoints must be UTF-8 char
//! boundaries. All stop bytes (`<`, `>`, `/`, `=`, quotes, ASCII whitespace)
//! are ASCII and cannot appear inside UTF-8 continuation bytes, so positions
//! reached through the scan_* methods always land on boundaries. Unscan is
//! only ever used to push back a just-scanned ASCII byte.

use memchr::memchr;

pub(crate) struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            position: 0,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    /// Consumes and returns the next byte, or `None` at end of input.
    pub(crate) fn scan_byte(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }

    /// Pushes back `count` already-consumed bytes.
    pub(crate) fn unscan(&mut self, count: usize) {
        debug_assert!(count <= self.position, "unscan past start of input");
        self.position = self.position.saturating_sub(count);
    }

    /// Skips `count` bytes, clamped to end of input.
    pub(crate) fn advance(&mut self, count: usize) {
        self.position = (self.position + count).min(self.bytes.len());
    }

    /// Consumes `needle` if it appears at the current position.
    pub(crate) fn expect(&mut self, needle: &str) -> bool {
        if self.input[self.position..].starts_with(needle) {
            self.position += needle.len();
            return true;
        }
        false
    }

    /// Scans up to (not including) the next occurrence of `stop`, or to end
    /// of input, returning the consumed span.
    pub(crate) fn scan_until_byte(&mut self, stop: u8) -> &'a str {
        debug_assert!(stop.is_ascii());
        let start = self.position;
        self.position = match memchr(stop, &self.bytes[start..]) {
            Some(rel) => start + rel,
            None => self.bytes.len(),
        };
        &self.input[start..self.position]
    }

    /// Scans up to (not including) the next occurrence of `stop`, or to end
    /// of input, returning the consumed span.
    pub(crate) fn scan_until_str(&mut self, stop: &str) -> &'a str {
        let start = self.position;
        self.position = match self.input[start..].find(stop) {
            Some(rel) => start + rel,
            None => self.bytes.len(),
        };
        &self.input[start..self.position]
    }

    /// Scans up to (not including) the first byte contained in `stops`,
    /// returning the consumed span. `stops` must be ASCII.
    pub(crate) fn scan_until_any(&mut self, stops: &[u8]) -> &'a str {
        debug_assert!(stops.is_ascii());
        let start = self.position;
        while self.position < self.bytes.len() && !stops.contains(&self.bytes[self.position]) {
            self.position += 1;
        }
        &self.input[start..self.position]
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self
            .bytes
            .get(self.position)
            .is_some_and(|b| matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
        {
            self.position += 1;
        }
    }
}
