//! Buffered, markable character source
//!
//! The scanner hands the pull parser bytes one at a time with arbitrary
//! lookahead. Input is either a complete slice (zero-copy) or any
//! `std::io::Read`, which is pulled in chunks as lookahead demands.
//!
//! Offsets are absolute document positions. A streamed buffer drops bytes
//! below the committed floor (see [`Scanner::commit`]) once enough of them
//! pile up, so memory stays proportional to the longest token.
//!
//! Name classification is byte based: ASCII letters, digits and punctuation
//! are checked exactly, every non-ASCII byte is accepted as a name byte.

use super::error::Location;
use memchr::{memchr_iter, memmem};
use std::borrow::Cow;
use std::cell::Cell;
use std::io::{ErrorKind as IoErrorKind, Read};
use std::ops::{Deref, DerefMut, Range};

/// Bytes requested from a reader per refill
const CHUNK_SIZE: usize = 8192;

/// Result of a lookahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peeked {
    Byte(u8),
    Eof,
    ReadError,
}

/// Line bookkeeping at a known offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineMark {
    offset: usize,
    line: usize,
    line_start: usize,
}

impl LineMark {
    const START: LineMark = LineMark {
        offset: 0,
        line: 1,
        line_start: 0,
    };
}

/// Byte scanner over an in-memory or streamed document
pub struct Scanner<'a> {
    input: Cow<'a, [u8]>,
    /// Absolute offset of `input[0]`
    base: usize,
    pos: usize,
    /// Nothing below this offset will be rewound to
    floor: usize,
    source: Option<Box<dyn Read + Send + 'a>>,
    read_failed: bool,
    /// Line state at `base`
    anchor: LineMark,
    /// Line state at the last reported location
    last_line: Cell<LineMark>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over a borrowed slice
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner {
            input: Cow::Borrowed(input),
            base: 0,
            pos: 0,
            floor: 0,
            source: None,
            read_failed: false,
            anchor: LineMark::START,
            last_line: Cell::new(LineMark::START),
        }
    }

    /// Create a scanner that owns its input
    pub fn from_vec(input: Vec<u8>) -> Self {
        Scanner {
            input: Cow::Owned(input),
            base: 0,
            pos: 0,
            floor: 0,
            source: None,
            read_failed: false,
            anchor: LineMark::START,
            last_line: Cell::new(LineMark::START),
        }
    }

    /// Create a scanner that pulls from a reader on demand
    pub fn from_reader<R: Read + Send + 'a>(reader: R) -> Self {
        Scanner {
            input: Cow::Owned(Vec::with_capacity(CHUNK_SIZE)),
            base: 0,
            pos: 0,
            floor: 0,
            source: Some(Box::new(reader)),
            read_failed: false,
            anchor: LineMark::START,
            last_line: Cell::new(LineMark::START),
        }
    }

    /// Current read offset
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the read offset (used to rewind to a recorded position).
    /// Offsets below the committed floor may already be discarded.
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos >= self.base, "rewind below discarded input");
        self.pos = pos.clamp(self.base, self.end());
    }

    /// Offset of the read cursor into the buffer
    #[inline]
    pub fn read_pointer(&self) -> usize {
        self.pos - self.base
    }

    /// Absolute offset one past the last buffered byte
    #[inline]
    pub fn top_pointer(&self) -> usize {
        self.end()
    }

    /// Number of bytes currently held in memory
    #[inline]
    pub fn buffered_len(&self) -> usize {
        self.input.len()
    }

    #[inline]
    fn end(&self) -> usize {
        self.base + self.input.len()
    }

    /// Declare that nothing before the cursor will be rewound to; streamed
    /// input below it may be discarded on the next refill
    #[inline]
    pub fn commit(&mut self) {
        self.floor = self.pos;
    }

    /// Buffered bytes from the cursor onward (may not be the whole rest of
    /// the document when reading from a stream)
    #[inline]
    pub fn available(&self) -> &[u8] {
        &self.input[self.pos - self.base..]
    }

    /// Buffered bytes in the absolute `range`
    #[inline]
    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        &self.input[range.start - self.base..range.end - self.base]
    }

    /// Whether the underlying reader reported an error
    #[inline]
    pub fn read_failed(&self) -> bool {
        self.read_failed
    }

    /// Pull another chunk from the reader. Returns false once the reader is
    /// exhausted, has failed, or there is no reader at all.
    pub fn fetch_more(&mut self) -> bool {
        if self.source.is_none() {
            return false;
        }
        self.compact();
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        let buffer = self.input.to_mut();
        let old_len = buffer.len();
        buffer.resize(old_len + CHUNK_SIZE, 0);
        loop {
            match source.read(&mut buffer[old_len..]) {
                Ok(0) => {
                    buffer.truncate(old_len);
                    self.source = None;
                    return false;
                }
                Ok(n) => {
                    buffer.truncate(old_len + n);
                    return true;
                }
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => {
                    log::debug!("input read failed: {}", e);
                    buffer.truncate(old_len);
                    self.source = None;
                    self.read_failed = true;
                    return false;
                }
            }
        }
    }

    /// Drop streamed bytes below the floor once they outweigh the rest
    fn compact(&mut self) {
        let dead = self.floor - self.base;
        if dead < CHUNK_SIZE || dead * 2 < self.input.len() {
            return;
        }
        self.anchor = self.line_at(self.floor);
        if self.last_line.get().offset < self.floor {
            self.last_line.set(self.anchor);
        }
        self.input.to_mut().drain(..dead);
        self.base = self.floor;
    }

    /// Make sure at least `n` bytes are buffered past the cursor
    #[inline]
    fn ensure(&mut self, n: usize) -> bool {
        while self.end() < self.pos + n {
            if !self.fetch_more() {
                return false;
            }
        }
        true
    }

    /// Look at the byte `offset` positions past the cursor
    pub fn peek_char(&mut self, offset: usize) -> Peeked {
        if self.ensure(offset + 1) {
            Peeked::Byte(self.input[self.pos - self.base + offset])
        } else if self.read_failed {
            Peeked::ReadError
        } else {
            Peeked::Eof
        }
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&mut self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&mut self, offset: usize) -> Option<u8> {
        match self.peek_char(offset) {
            Peeked::Byte(b) => Some(b),
            Peeked::Eof | Peeked::ReadError => None,
        }
    }

    /// Consume and return the current byte
    #[inline]
    pub fn read_char(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    #[inline]
    pub fn skip_char(&mut self) {
        self.skip_chars(1);
    }

    /// Advance by n bytes (never past the buffered input)
    #[inline]
    pub fn skip_chars(&mut self, n: usize) {
        self.ensure(n);
        self.pos = (self.pos + n).min(self.end());
    }

    /// Undo the last `read_char`
    #[inline]
    pub fn put_back(&mut self) {
        self.pos = self.pos.saturating_sub(1).max(self.base);
    }

    /// Check if input continues with `literal` at the cursor
    #[inline]
    pub fn has_string(&mut self, literal: &[u8]) -> bool {
        self.has_string_at(0, literal, false)
    }

    /// Like `has_string`, ignoring ASCII case
    #[inline]
    pub fn has_string_ignore_case(&mut self, literal: &[u8]) -> bool {
        self.has_string_at(0, literal, true)
    }

    /// Check for `literal` starting `offset` bytes past the cursor
    pub fn has_string_at(&mut self, offset: usize, literal: &[u8], ignore_case: bool) -> bool {
        if !self.ensure(offset + literal.len()) {
            return false;
        }
        let start = self.pos - self.base + offset;
        let candidate = &self.input[start..start + literal.len()];
        if ignore_case {
            candidate.eq_ignore_ascii_case(literal)
        } else {
            candidate == literal
        }
    }

    /// Skip whitespace characters (space, tab, newline, carriage return),
    /// returning how many were skipped
    pub fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    /// Find the next occurrence of `needle` at or after the cursor,
    /// fetching more input as needed. Returns its absolute offset.
    pub fn find(&mut self, needle: &[u8]) -> Option<usize> {
        let mut from = self.pos;
        loop {
            if let Some(i) = memmem::find(&self.input[from - self.base..], needle) {
                return Some(from + i);
            }
            let searched = self.end();
            if !self.fetch_more() {
                return None;
            }
            // A match may straddle the old end of the buffer
            from = searched
                .saturating_sub(needle.len().saturating_sub(1))
                .max(self.pos);
        }
    }

    /// Read an XML name at the cursor, returning its byte range
    pub fn read_name(&mut self) -> Option<Range<usize>> {
        let start = self.pos;
        if !is_name_start_char(self.peek()?) {
            return None;
        }
        self.pos += 1;
        while let Some(b) = self.peek() {
            if !is_name_char(b) {
                break;
            }
            self.pos += 1;
        }
        Some(start..self.pos)
    }

    /// Line and column of the cursor, for diagnostics. Counting resumes
    /// from the previous call, so reporting while scanning stays linear.
    pub fn location(&self) -> Location {
        let mark = self.line_at(self.pos);
        self.last_line.set(mark);
        Location {
            line: mark.line,
            column: mark.offset - mark.line_start + 1,
            offset: mark.offset,
        }
    }

    fn line_at(&self, offset: usize) -> LineMark {
        let last = self.last_line.get();
        let from = if last.offset >= self.base && last.offset <= offset {
            last
        } else {
            self.anchor
        };
        let offset = offset.max(from.offset);
        let mut mark = LineMark { offset, ..from };
        let counted = &self.input[from.offset - self.base..offset - self.base];
        for nl in memchr_iter(b'\n', counted) {
            mark.line += 1;
            mark.line_start = from.offset + nl + 1;
        }
        mark
    }

    /// Record the cursor; the returned guard rewinds to it when dropped
    /// unless released first
    #[inline]
    pub fn mark(&mut self) -> Marker<'_, 'a> {
        let saved = self.pos;
        Marker {
            scanner: self,
            saved,
            released: false,
        }
    }
}

/// Scoped rewind point over a [`Scanner`]
pub struct Marker<'s, 'a> {
    scanner: &'s mut Scanner<'a>,
    saved: usize,
    released: bool,
}

impl Marker<'_, '_> {
    /// Keep everything consumed since the mark
    #[inline]
    pub fn release(mut self) {
        self.released = true;
    }

    /// Return the cursor to the mark; the guard stays active
    #[inline]
    pub fn rewind(&mut self) {
        self.scanner.pos = self.saved;
    }

    /// Offset the mark was taken at
    #[inline]
    pub fn start(&self) -> usize {
        self.saved
    }
}

impl<'a> Deref for Marker<'_, 'a> {
    type Target = Scanner<'a>;

    fn deref(&self) -> &Self::Target {
        self.scanner
    }
}

impl DerefMut for Marker<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.scanner
    }
}

impl Drop for Marker<'_, '_> {
    fn drop(&mut self) {
        if !self.released {
            self.scanner.pos = self.saved;
        }
    }
}

/// Check if byte is whitespace
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Check if byte is valid XML name start character
/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

/// Check if byte is valid XML name character
/// Allows ASCII alphanumeric, punctuation, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Reader that hands out a few bytes per call
    struct Trickle<'d> {
        data: &'d [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(self.data.len()).min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new(b"element-name>");
        assert_eq!(scanner.read_name(), Some(0..12));
        assert_eq!(scanner.position(), 12);
        assert_eq!(scanner.peek(), Some(b'>'));
    }

    #[test]
    fn test_read_name_rejects_digit_start() {
        let mut scanner = Scanner::new(b"1abc");
        assert_eq!(scanner.read_name(), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = Scanner::new(b"  \t\n hello");
        assert_eq!(scanner.skip_whitespace(), 5);
        assert_eq!(scanner.peek(), Some(b'h'));
    }

    #[test]
    fn test_peek_sentinels() {
        let mut scanner = Scanner::new(b"a");
        assert_eq!(scanner.peek_char(0), Peeked::Byte(b'a'));
        assert_eq!(scanner.peek_char(1), Peeked::Eof);

        let mut broken = Scanner::from_reader(Broken);
        assert_eq!(broken.peek_char(0), Peeked::ReadError);
        assert!(broken.read_failed());
    }

    #[test]
    fn test_read_and_put_back() {
        let mut scanner = Scanner::new(b"xy");
        assert_eq!(scanner.read_char(), Some(b'x'));
        scanner.put_back();
        assert_eq!(scanner.read_char(), Some(b'x'));
        assert_eq!(scanner.read_char(), Some(b'y'));
        assert_eq!(scanner.read_char(), None);
    }

    #[test]
    fn test_streamed_lookahead() {
        let mut scanner = Scanner::from_reader(Trickle {
            data: b"<![CDATA[abc]]>",
            step: 2,
        });
        assert!(scanner.has_string(b"<![CDATA["));
        scanner.skip_chars(9);
        assert_eq!(scanner.find(b"]]>"), Some(12));
    }

    #[test]
    fn test_has_string_ignore_case() {
        let mut scanner = Scanner::new(b"<!doctype html>");
        assert!(!scanner.has_string(b"<!DOCTYPE"));
        assert!(scanner.has_string_ignore_case(b"<!DOCTYPE"));
    }

    #[test]
    fn test_marker_rewinds_on_drop() {
        let mut scanner = Scanner::new(b"&amp; rest");
        {
            let mut marker = scanner.mark();
            marker.skip_chars(4);
            assert_eq!(marker.peek(), Some(b';'));
        }
        assert_eq!(scanner.position(), 0);

        let mut marker = scanner.mark();
        marker.skip_chars(5);
        marker.release();
        assert_eq!(scanner.position(), 5);
    }

    #[test]
    fn test_location() {
        let mut scanner = Scanner::new(b"<a>\n  <b/>\n</a>");
        scanner.skip_chars(6);
        let loc = scanner.location();
        assert_eq!((loc.line, loc.column, loc.offset), (2, 3, 6));
    }

    #[test]
    fn test_location_after_rewind() {
        let mut scanner = Scanner::new(b"a\nbc\nd");
        scanner.skip_chars(6);
        assert_eq!(scanner.location().line, 3);
        scanner.set_position(3);
        let loc = scanner.location();
        assert_eq!((loc.line, loc.column), (2, 2));
    }

    #[test]
    fn test_committed_stream_is_compacted() {
        let data = b"abcd\n".repeat(40_000);
        let mut scanner = Scanner::from_reader(Trickle {
            data: &data,
            step: 1000,
        });
        let mut peak = 0;
        let mut middle = None;
        while scanner.read_char().is_some() {
            scanner.commit();
            peak = peak.max(scanner.buffered_len());
            if scanner.position() == 100_002 {
                middle = Some(scanner.location());
            }
        }
        assert!(peak <= 2 * CHUNK_SIZE, "peak buffer {}", peak);
        assert_eq!(scanner.top_pointer(), data.len());

        let middle = middle.unwrap();
        assert_eq!((middle.line, middle.column), (20_001, 3));
        let end = scanner.location();
        assert_eq!((end.line, end.column, end.offset), (40_001, 1, data.len()));
    }

    #[test]
    fn test_rewind_within_committed_window() {
        let data = b"x".repeat(3 * CHUNK_SIZE);
        let mut scanner = Scanner::from_reader(Trickle {
            data: &data,
            step: CHUNK_SIZE,
        });
        scanner.skip_chars(2 * CHUNK_SIZE);
        scanner.commit();
        let start = scanner.position();
        scanner.skip_chars(CHUNK_SIZE / 2);
        assert_eq!(scanner.find(b"y"), None);
        scanner.set_position(start);
        assert_eq!(scanner.position(), start);
        assert_eq!(scanner.available().len(), CHUNK_SIZE);
        assert_eq!(scanner.location().column, start + 1);
    }
}
