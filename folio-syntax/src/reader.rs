//! A byte reader.

use crate::trivia::{is_eol_character, is_white_space_character};
use std::ops::Range;

/// A reader for reading bytes of a PDF file.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Create a new reader.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a new reader at the given offset.
    #[inline]
    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// Returns `true` if the reader has reached the end of the data.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Moves the reader to the specified offset.
    #[inline]
    pub fn jump(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Returns the underlying data.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the remaining data from the current offset to the end.
    #[inline]
    pub fn tail(&self) -> Option<&'a [u8]> {
        self.data.get(self.offset..)
    }

    /// Returns a slice of the data for the specified range.
    #[inline]
    pub fn range(&self, range: Range<usize>) -> Option<&'a [u8]> {
        self.data.get(range)
    }

    /// Returns the current offset of the reader.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reads the specified number of bytes and advances the offset.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let v = self.peek_bytes(len)?;
        self.offset += len;

        Some(v)
    }

    /// Reads a single byte and advances the offset.
    #[inline]
    pub fn read_byte(&mut self) -> Option<u8> {
        let v = self.peek_byte()?;
        self.offset += 1;

        Some(v)
    }

    /// Peeks the specified number of bytes.
    #[inline]
    pub fn peek_bytes(&self, len: usize) -> Option<&'a [u8]> {
        self.data.get(self.offset..self.offset.checked_add(len)?)
    }

    /// Peeks a single byte.
    #[inline]
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Eat the next byte if it satisfies the condition.
    #[inline]
    pub fn eat(&mut self, f: impl Fn(u8) -> bool) -> Option<u8> {
        let val = self.peek_byte()?;
        if f(val) {
            self.forward();
            Some(val)
        } else {
            None
        }
    }

    /// Advances the offset by one byte.
    #[inline]
    pub fn forward(&mut self) {
        self.offset += 1;
    }

    /// Advances the offset while bytes satisfy the predicate, at least one time.
    #[inline]
    pub fn forward_while_1(&mut self, f: impl Fn(u8) -> bool) -> Option<()> {
        self.eat(&f)?;
        self.forward_while(f);
        Some(())
    }

    /// Advances the offset while the given byte satisfies the predicate.
    #[inline]
    pub fn forward_while(&mut self, f: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek_byte() {
            if f(b) {
                self.forward();
            } else {
                break;
            }
        }
    }

    /// Advances the offset if the next bytes match the specified tag.
    #[inline]
    pub fn forward_tag(&mut self, tag: &[u8]) -> Option<()> {
        self.peek_tag(tag)?;
        self.offset += tag.len();

        Some(())
    }

    /// Checks if the next bytes match the specified tag.
    #[inline]
    pub fn peek_tag(&self, tag: &[u8]) -> Option<()> {
        (self.peek_bytes(tag.len())? == tag).then_some(())
    }

    /// Skip white spaces and comments.
    pub fn skip_white_spaces_and_comments(&mut self) {
        loop {
            self.skip_white_spaces();

            if self.peek_byte() == Some(b'%') {
                self.forward_while(|b| !is_eol_character(b));
            } else {
                return;
            }
        }
    }

    /// Skip white spaces, including end-of-line markers.
    #[inline]
    pub fn skip_white_spaces(&mut self) {
        self.forward_while(is_white_space_character);
    }

    /// Skip a single end-of-line marker (`\r\n`, `\n` or `\r`).
    #[inline]
    pub fn skip_eol(&mut self) -> Option<()> {
        match self.peek_byte()? {
            b'\r' => {
                self.forward();
                if self.peek_byte() == Some(b'\n') {
                    self.forward();
                }
                Some(())
            }
            b'\n' => {
                self.forward();
                Some(())
            }
            _ => None,
        }
    }

    /// Read an unsigned decimal integer without a sign.
    pub fn read_unsigned(&mut self) -> Option<u64> {
        let start = self.offset;
        self.forward_while_1(|b| b.is_ascii_digit())?;
        let digits = self.range(start..self.offset)?;

        digits.iter().try_fold(0_u64, |acc, d| {
            acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
        })
    }

    /// Read a big-endian unsigned integer stored in `len` bytes (at most 8).
    pub fn read_be_uint(&mut self, len: usize) -> Option<u64> {
        if len > 8 {
            return None;
        }

        let bytes = self.read_bytes(len)?;
        Some(bytes.iter().fold(0, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

#[cfg(test)]
mod tests {
    use super::Reader;

    #[test]
    fn comments_are_skipped() {
        let mut r = Reader::new(b"  % a comment\r\n%another\n  12");
        r.skip_white_spaces_and_comments();
        assert_eq!(r.read_unsigned(), Some(12));
        assert!(r.at_end());
    }

    #[test]
    fn unsigned_overflow() {
        let mut r = Reader::new(b"99999999999999999999999");
        assert_eq!(r.read_unsigned(), None);
    }

    #[test]
    fn big_endian_widths() {
        let mut r = Reader::new(&[0x01, 0x02, 0x03, 0xff]);
        assert_eq!(r.read_be_uint(3), Some(0x010203));
        assert_eq!(r.read_be_uint(0), Some(0));
        assert_eq!(r.read_be_uint(2), None);
    }

    #[test]
    fn eol_variants() {
        let mut r = Reader::new(b"\r\nx");
        r.skip_eol();
        assert_eq!(r.peek_byte(), Some(b'x'));

        let mut r = Reader::new(b"\rx");
        r.skip_eol();
        assert_eq!(r.peek_byte(), Some(b'x'));
    }
}
